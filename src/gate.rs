//! `Gate`: like `Copy`, but only accepts input while externally enabled.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// A registered buffer identical to [`crate::copy::Copy`], except it only
/// asserts readiness on `input` while its `en` flag is set.
pub struct Gate<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    held: Option<Beat<T>>,
    en: Arc<AtomicBool>,
}

impl<T: Clone> Gate<T> {
    /// Create a new `Gate`, initially enabled or not per `initial_en`.
    pub fn new(input: ReadStream<T>, initial_en: bool) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            held: None,
            en: Arc::new(AtomicBool::new(initial_en)),
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }

    /// A shared handle for toggling `en` from outside the graph.
    #[must_use]
    pub fn enable_handle(&self) -> Arc<AtomicBool> {
        self.en.clone()
    }

    /// Set `en` directly.
    pub fn set_enable(&self, value: bool) {
        self.en.store(value, Ordering::Relaxed);
    }
}

impl<T> BlockName for Gate<T> {
    fn block_name(&self) -> &str {
        "Gate"
    }
}

impl<T> BlockEOF for Gate<T> {
    fn eof(&mut self) -> bool {
        self.held.is_none() && self.input.eof()
    }
}

impl<T: Clone + Send> Block for Gate<T> {
    fn work(&mut self) -> BlockRet {
        if let Some(beat) = self.held.take() {
            if self.output.is_full() {
                self.held = Some(beat);
                return BlockRet::Noop;
            }
            self.output.push(beat);
            return BlockRet::Ok;
        }
        if !self.en.load(Ordering::Relaxed) {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                self.held = Some(beat);
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
    fn blocks_input_while_disabled() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(1));
        let mut g = Gate::new(r, false);
        let out = g.out();
        assert_eq!(g.work(), BlockRet::Noop);
        g.set_enable(true);
        assert_eq!(g.work(), BlockRet::Ok);
        assert_eq!(g.work(), BlockRet::Ok);
        assert_eq!(out.pop().unwrap().payload, 1);
    }
}
