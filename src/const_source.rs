//! `ConstSource`: continuously emits single-beat packets of a fixed value.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// Emits single-beat packets (`first = last = 1`) carrying the configured
/// constant field values, forever or `count` times.
pub struct ConstSource {
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    record: Record,
    remaining: Option<u64>,
}

impl ConstSource {
    /// Create a new `ConstSource` over `layout`, with the given field
    /// values, emitting forever (`count = None`) or `count` times.
    pub fn new(layout: Arc<Layout>, fields: Vec<(&str, u64)>, count: Option<u64>) -> Result<Self> {
        let mut rec = Record::zero(layout);
        for (name, value) in fields {
            rec.set(name, value)?;
        }
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            output,
            out_r,
            record: rec,
            remaining: count,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for ConstSource {
    fn block_name(&self) -> &str {
        "ConstSource"
    }
}

impl BlockEOF for ConstSource {
    fn eof(&mut self) -> bool {
        self.remaining == Some(0)
    }
}

impl Block for ConstSource {
    fn work(&mut self) -> BlockRet {
        if self.remaining == Some(0) {
            return BlockRet::EOF;
        }
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        self.output.push(Beat::single(self.record.clone()));
        if let Some(n) = &mut self.remaining {
            *n -= 1;
        }
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_the_configured_count_then_eof() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let mut src = ConstSource::new(layout, vec![("data", 42)], Some(2)).unwrap();
        let out = src.out();
        assert_eq!(src.work(), BlockRet::Ok);
        assert_eq!(src.work(), BlockRet::Ok);
        assert_eq!(src.work(), BlockRet::EOF);
        assert_eq!(out.pop().unwrap().payload.get("data").unwrap(), 42);
        assert_eq!(out.pop().unwrap().payload.get("data").unwrap(), 42);
    }
}
