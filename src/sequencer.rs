//! `Sequencer`: generates a configurable arithmetic-progression packet.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// Generates a packet of `count` values, `base, base+incr, base+2*incr, ...`,
/// one `field`-valued beat per call once [`Sequencer::trigger`] is called.
/// `busy()` is high throughout generation.
pub struct Sequencer {
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    layout: Arc<Layout>,
    field: String,
    base: u64,
    incr: u64,
    count: u64,
    idx: u64,
    active: bool,
}

impl Sequencer {
    /// Create a new, idle `Sequencer`.
    pub fn new(layout: Arc<Layout>, field: &str, base: u64, incr: u64, count: u64) -> Result<Self> {
        layout.width(field)?;
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            output,
            out_r,
            layout,
            field: field.to_string(),
            base,
            incr,
            count,
            idx: 0,
            active: false,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }

    /// Start a new generation run, if not already in progress.
    pub fn trigger(&mut self) {
        if !self.active {
            self.active = true;
            self.idx = 0;
        }
    }

    /// True while a packet is being generated.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.active
    }
}

impl BlockName for Sequencer {
    fn block_name(&self) -> &str {
        "Sequencer"
    }
}

impl BlockEOF for Sequencer {
    fn eof(&mut self) -> bool {
        false
    }
}

impl Block for Sequencer {
    fn work(&mut self) -> BlockRet {
        if !self.active {
            return BlockRet::Noop;
        }
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let mut rec = Record::zero(self.layout.clone());
        let value = self.base.wrapping_add(self.incr.wrapping_mul(self.idx));
        rec.set(&self.field, value).expect("field validated at construction");
        let beat = Beat {
            payload: rec,
            first: self.idx == 0,
            last: self.idx + 1 == self.count,
        };
        self.output.push(beat);
        self.idx += 1;
        if self.idx == self.count {
            self.active = false;
        }
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_arithmetic_progression() {
        let layout = Arc::new(Layout::data(16).unwrap());
        let mut seq = Sequencer::new(layout, "data", 10, 2, 3).unwrap();
        let out = seq.out();
        seq.trigger();
        while seq.busy() {
            seq.work();
        }
        let b0 = out.pop().unwrap();
        assert_eq!(b0.payload.get("data").unwrap(), 10);
        assert!(b0.first && !b0.last);
        let b1 = out.pop().unwrap();
        assert_eq!(b1.payload.get("data").unwrap(), 12);
        let b2 = out.pop().unwrap();
        assert_eq!(b2.payload.get("data").unwrap(), 14);
        assert!(b2.last);
    }
}
