//! `Packetiser`: imposes packet framing on an otherwise unframed stream.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// Groups an unframed stream into packets of up to `max_size` beats,
/// asserting `first` on the first beat of each group and `last` on the
/// final one. The grouping counter resets at each boundary.
pub struct Packetiser<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    max_size: u64,
    count: u64,
}

impl<T: Clone> Packetiser<T> {
    /// Create a new `Packetiser` grouping `input` into packets of up to
    /// `max_size` beats.
    pub fn new(input: ReadStream<T>, max_size: u64) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            max_size,
            count: 0,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for Packetiser<T> {
    fn block_name(&self) -> &str {
        "Packetiser"
    }
}

impl<T> BlockEOF for Packetiser<T> {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}

impl<T: Clone + Send> Block for Packetiser<T> {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                let first = self.count == 0;
                self.count += 1;
                let last = self.count == self.max_size;
                if last {
                    self.count = 0;
                }
                self.output.push(Beat {
                    payload: beat.payload,
                    first,
                    last,
                });
                BlockRet::Ok
            }
            None => {
                if self.input.eof() {
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
    use crate::stream::new_stream;

    #[test]
    fn groups_into_fixed_size_packets() {
        let (w, r) = new_stream::<u32>(8);
        for v in 1..=5u32 {
            w.push(Beat::single(v));
        }
        drop(w);
        let mut p = Packetiser::new(r, 2);
        let out = p.out();
        while p.work() != BlockRet::EOF {}
        let beats: Vec<_> = std::iter::from_fn(|| out.pop()).collect();
        assert_eq!(beats.len(), 5);
        assert!(beats[0].first && !beats[0].last);
        assert!(!beats[1].first && beats[1].last);
        assert!(beats[2].first && !beats[2].last);
        assert!(beats[4].first && beats[4].last);
    }
}
