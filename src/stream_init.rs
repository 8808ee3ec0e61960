//! `StreamInit`: emits a fixed prologue before passing `input` through.
use std::collections::VecDeque;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// Emits `init_packets` out of `o` before any input is forwarded, then
/// transparently passes `i -> o` forever. [`StreamInit::clear`] reverts to
/// re-emitting the initial sequence.
pub struct StreamInit<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    init: Vec<Beat<T>>,
    queue: VecDeque<Beat<T>>,
}

impl<T: Clone> StreamInit<T> {
    /// Create a new `StreamInit` that emits `init_packets` before forwarding
    /// beats from `input`.
    pub fn new(input: ReadStream<T>, init_packets: Vec<Beat<T>>) -> Self {
        let (output, out_r) = WriteStream::new();
        let queue = init_packets.iter().cloned().collect();
        Self {
            input,
            output,
            out_r,
            init: init_packets,
            queue,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }

    /// Revert to re-emitting the initial sequence.
    pub fn clear(&mut self) {
        self.queue = self.init.iter().cloned().collect();
    }
}

impl<T> BlockName for StreamInit<T> {
    fn block_name(&self) -> &str {
        "StreamInit"
    }
}

impl<T> BlockEOF for StreamInit<T> {
    fn eof(&mut self) -> bool {
        self.queue.is_empty() && self.input.eof()
    }
}

impl<T: Clone + Send> Block for StreamInit<T> {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        if let Some(beat) = self.queue.pop_front() {
            self.output.push(beat);
            return BlockRet::Ok;
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
    use crate::stream::new_stream;

    #[test]
    fn emits_prologue_before_forwarding() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(9));
        drop(w);
        let mut si = StreamInit::new(r, vec![Beat::single(1), Beat::single(2)]);
        let out = si.out();
        while si.work() != BlockRet::EOF {}
        assert_eq!(out.pop().unwrap().payload, 1);
        assert_eq!(out.pop().unwrap().payload, 2);
        assert_eq!(out.pop().unwrap().payload, 9);
    }
}
