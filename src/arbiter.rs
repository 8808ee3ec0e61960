//! `Arbiter`: round-robin arbitration at packet granularity.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::stream::{ReadStream, WriteStream};

/// Round-robins among `n` inputs at the packet granularity: once an input
/// presenting a `first`-flagged beat is selected, its whole packet is
/// copied to `o` verbatim before arbitration runs again.
pub struct Arbiter<T> {
    inputs: Vec<ReadStream<T>>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    rotate: usize,
    active: Option<usize>,
}

impl<T: Clone> Arbiter<T> {
    /// Create a new `Arbiter` over `inputs`.
    pub fn new(inputs: Vec<ReadStream<T>>) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            inputs,
            output,
            out_r,
            rotate: 0,
            active: None,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for Arbiter<T> {
    fn block_name(&self) -> &str {
        "Arbiter"
    }
}

impl<T> BlockEOF for Arbiter<T> {
    fn eof(&mut self) -> bool {
        self.active.is_none() && self.inputs.iter().all(|s| s.eof())
    }
}

impl<T: Clone + Send> Block for Arbiter<T> {
    fn work(&mut self) -> BlockRet {
        let n = self.inputs.len();
        if let Some(i) = self.active {
            if self.output.is_full() {
                return BlockRet::Noop;
            }
            return match self.inputs[i].pop() {
                Some(beat) => {
                    let last = beat.last;
                    self.output.push(beat);
                    if last {
                        self.active = None;
                        self.rotate = (i + 1) % n;
                    }
                    BlockRet::Ok
                }
                None => BlockRet::Noop,
            };
        }
        for off in 0..n {
            let i = (self.rotate + off) % n;
            if let Some(beat) = self.inputs[i].peek() {
                if beat.first {
                    self.active = Some(i);
                    return BlockRet::Ok;
                }
            }
        }
        if self.inputs.iter().all(|s| s.eof()) {
            BlockRet::EOF
        } else {
            BlockRet::Noop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_packet;
    use crate::stream::new_stream;

    #[test]
    fn copies_one_packet_at_a_time() {
        let (w0, r0) = new_stream::<u32>(8);
        let (w1, r1) = new_stream::<u32>(8);
        for b in to_packet(&[1, 2]) {
            w0.push(b);
        }
        for b in to_packet(&[9]) {
            w1.push(b);
        }
        drop(w0);
        drop(w1);
        let mut a = Arbiter::new(vec![r0, r1]);
        let out = a.out();
        while a.work() != BlockRet::EOF {}
        let values: Vec<u32> = std::iter::from_fn(|| out.pop()).map(|b| b.payload).collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains(&1) && values.contains(&2) && values.contains(&9));
    }
}
