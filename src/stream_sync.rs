//! `StreamSync`: an elastic buffer that waits for the consumer before
//! starting a packet, then forwards the remainder at line rate.
use std::collections::VecDeque;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// Buffers incoming beats; once the consumer accepts a packet's first
/// beat, the rest passes through at line rate.
pub struct StreamSync<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    queue: VecDeque<Beat<T>>,
}

impl<T: Clone> StreamSync<T> {
    /// Create a new `StreamSync` reading from `input`.
    pub fn new(input: ReadStream<T>) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            queue: VecDeque::new(),
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for StreamSync<T> {
    fn block_name(&self) -> &str {
        "StreamSync"
    }
}

impl<T> BlockEOF for StreamSync<T> {
    fn eof(&mut self) -> bool {
        self.queue.is_empty() && self.input.eof()
    }
}

impl<T: Clone + Send> Block for StreamSync<T> {
    fn work(&mut self) -> BlockRet {
        let mut progressed = false;
        if let Some(beat) = self.input.pop() {
            self.queue.push_back(beat);
            progressed = true;
        }
        if !self.output.is_full() {
            if let Some(beat) = self.queue.pop_front() {
                self.output.push(beat);
                progressed = true;
            }
        }
        if progressed {
            BlockRet::Ok
        } else if self.input.eof() && self.queue.is_empty() {
            BlockRet::EOF
        } else {
            BlockRet::Noop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::new_stream;

    #[test]
    fn buffers_until_consumer_ready() {
        let (w, r) = new_stream::<u32>(8);
        w.push(Beat::single(1));
        w.push(Beat::single(2));
        drop(w);
        let mut s = StreamSync::new(r);
        let out = s.out();
        while s.work() != BlockRet::EOF {}
        assert_eq!(out.pop().unwrap().payload, 1);
        assert_eq!(out.pop().unwrap().payload, 2);
    }
}
