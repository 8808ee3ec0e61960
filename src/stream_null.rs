//! `StreamNull`: drops the first `n` transfers, then forwards transparently.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::stream::{ReadStream, WriteStream};

/// Drops the first `n` transfers seen on `input`, then forwards the rest.
pub struct StreamNull<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    remaining: u64,
}

impl<T: Clone> StreamNull<T> {
    /// Create a new `StreamNull` dropping the first `n` beats of `input`.
    pub fn new(input: ReadStream<T>, n: u64) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            remaining: n,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for StreamNull<T> {
    fn block_name(&self) -> &str {
        "StreamNull"
    }
}

impl<T> BlockEOF for StreamNull<T> {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}

impl<T: Clone + Send> Block for StreamNull<T> {
    fn work(&mut self) -> BlockRet {
        if self.remaining > 0 {
            return match self.input.pop() {
                Some(_) => {
                    self.remaining -= 1;
                    BlockRet::Ok
                }
                None => {
                    if self.input.eof() {
                        BlockRet::EOF
                    } else {
                        BlockRet::Noop
                    }
                }
            };
        }
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                self.output.push(beat);
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
    use crate::layout::Beat;
    use crate::stream::new_stream;

    #[test]
    fn drops_leading_transfers() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(1));
        w.push(Beat::single(2));
        w.push(Beat::single(3));
        drop(w);
        let mut n = StreamNull::new(r, 2);
        let out = n.out();
        while n.work() != BlockRet::EOF {}
        assert_eq!(out.pop().unwrap().payload, 3);
        assert!(out.pop().is_none());
    }
}
