//! `GatePacket`: admits whole packets only, gated on a rising `en`.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::stream::{ReadStream, WriteStream};

/// Forwards whole packets only. A packet's first beat is only accepted
/// while `en` is high; once admitted, the rest of the packet passes
/// regardless of `en` until `last`.
pub struct GatePacket<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    en: Arc<AtomicBool>,
    admitted: bool,
}

impl<T: Clone> GatePacket<T> {
    /// Create a new `GatePacket`, initially enabled or not per `initial_en`.
    pub fn new(input: ReadStream<T>, initial_en: bool) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            en: Arc::new(AtomicBool::new(initial_en)),
            admitted: false,
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

impl<T> BlockName for GatePacket<T> {
    fn block_name(&self) -> &str {
        "GatePacket"
    }
}

impl<T> BlockEOF for GatePacket<T> {
    fn eof(&mut self) -> bool {
        !self.admitted && self.input.eof()
    }
}

impl<T: Clone + Send> Block for GatePacket<T> {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let Some(beat) = self.input.peek() else {
            return if self.input.eof() {
                BlockRet::EOF
            } else {
                BlockRet::Noop
            };
        };
        if !self.admitted {
            if beat.first && self.en.load(Ordering::Relaxed) {
                self.admitted = true;
            } else {
                return BlockRet::Noop;
            }
        }
        let beat = self.input.pop().expect("peeked beat must still be present");
        let last = beat.last;
        self.output.push(beat);
        if last {
            self.admitted = false;
        }
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_packet;
    use crate::stream::new_stream;

    #[test]
    fn withholds_packets_until_enabled() {
        let (w, r) = new_stream::<u32>(8);
        for b in to_packet(&[1, 2, 3]) {
            w.push(b);
        }
        drop(w);
        let mut g = GatePacket::new(r, false);
        let out = g.out();
        assert_eq!(g.work(), BlockRet::Noop);
        g.set_enable(true);
        while g.work() != BlockRet::EOF {}
        assert_eq!(out.pop().unwrap().payload, 1);
        assert_eq!(out.pop().unwrap().payload, 2);
        assert_eq!(out.pop().unwrap().payload, 3);
    }
}
