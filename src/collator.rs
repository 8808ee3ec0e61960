//! `Collator`: assembles one output packet per round-robin pass over `n`
//! inputs.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// For each output packet, reads exactly one beat from input 0, then one
/// from input 1, ... then one from input `n-1`; each contributed beat
/// becomes one element of the output packet.
pub struct Collator<T> {
    inputs: Vec<ReadStream<T>>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    idx: usize,
}

impl<T: Clone> Collator<T> {
    /// Create a new `Collator` over `inputs`.
    pub fn new(inputs: Vec<ReadStream<T>>) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            inputs,
            output,
            out_r,
            idx: 0,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for Collator<T> {
    fn block_name(&self) -> &str {
        "Collator"
    }
}

impl<T> BlockEOF for Collator<T> {
    fn eof(&mut self) -> bool {
        self.idx == 0 && self.inputs.iter().all(|s| s.eof())
    }
}

impl<T: Clone + Send> Block for Collator<T> {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let n = self.inputs.len();
        match self.inputs[self.idx].pop() {
            Some(beat) => {
                let first = self.idx == 0;
                let last = self.idx == n - 1;
                self.output.push(Beat {
                    payload: beat.payload,
                    first,
                    last,
                });
                self.idx = (self.idx + 1) % n;
                BlockRet::Ok
            }
            None => {
                if self.inputs[self.idx].eof() {
                    BlockRet::EOF
                } else {
                    BlockRet::Noop
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_packet;
    use crate::stream::new_stream;

    #[test]
    fn round_robins_across_inputs() {
        let (w0, r0) = new_stream::<u32>(4);
        let (w1, r1) = new_stream::<u32>(4);
        for b in to_packet(&[1, 1]) {
            w0.push(b);
        }
        for b in to_packet(&[2, 2]) {
            w1.push(b);
        }
        drop(w0);
        drop(w1);
        let mut c = Collator::new(vec![r0, r1]);
        let out = c.out();
        for _ in 0..4 {
            c.work();
        }
        let beats: Vec<_> = std::iter::from_fn(|| out.pop()).collect();
        let values: Vec<u32> = beats.iter().map(|b| b.payload).collect();
        assert_eq!(values, vec![1, 2, 1, 2]);
        assert!(beats[0].first && !beats[0].last);
        assert!(beats[1].last);
    }
}
