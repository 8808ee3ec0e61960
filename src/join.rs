//! `Join`: waits for a beat on every input, then emits their concatenation.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// Waits until every input stream has a valid beat, then emits one output
/// beat concatenating their payloads in input order. `first`/`last` are
/// taken from input 0 (the consolidated N-input form — see DESIGN.md).
pub struct Join {
    inputs: Vec<ReadStream<Record>>,
    out_layout: Arc<Layout>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
}

impl Join {
    /// Create a new `Join` over `inputs`. Errors if any two inputs' layouts
    /// share a field name.
    pub fn new(inputs: Vec<ReadStream<Record>>, layouts: &[Arc<Layout>]) -> Result<Self> {
        let mut out_layout = (*layouts[0]).clone();
        for l in &layouts[1..] {
            out_layout = out_layout.concat(l)?;
        }
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            inputs,
            out_layout: Arc::new(out_layout),
            output,
            out_r,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Join {
    fn block_name(&self) -> &str {
        "Join"
    }
}

impl BlockEOF for Join {
    fn eof(&mut self) -> bool {
        self.inputs.iter().any(|s| s.eof())
    }
}

impl Block for Join {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let peeks: Vec<Option<Beat<Record>>> = self.inputs.iter().map(|s| s.peek()).collect();
        if peeks.iter().any(Option::is_none) {
            return if self.inputs.iter().any(|s| s.eof()) {
                BlockRet::EOF
            } else {
                BlockRet::Noop
            };
        }
        let beats: Vec<Beat<Record>> = peeks.into_iter().map(Option::unwrap).collect();
        for s in &self.inputs {
            s.pop();
        }
        let mut combined = Record::zero(self.out_layout.clone());
        for beat in &beats {
            for (name, _) in beat.payload.layout().fields() {
                combined.set(name, beat.payload.get(name).unwrap()).unwrap();
            }
        }
        self.output.push(Beat {
            payload: combined,
            first: beats[0].first,
            last: beats[0].last,
        });
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::stream::new_stream;

    #[test]
    fn waits_for_every_input_then_concatenates() {
        let la = Arc::new(Layout::new(vec![("a", 8)]).unwrap());
        let lb = Arc::new(Layout::new(vec![("b", 8)]).unwrap());
        let (wa, ra) = new_stream::<Record>(4);
        let (wb, rb) = new_stream::<Record>(4);
        let mut ra_rec = Record::zero(la.clone());
        ra_rec.set("a", 1).unwrap();
        wa.push(Beat::single(ra_rec));
        let mut rb_rec = Record::zero(lb.clone());
        rb_rec.set("b", 2).unwrap();
        wb.push(Beat::single(rb_rec));
        let mut j = Join::new(vec![ra, rb], &[la, lb]).unwrap();
        let out = j.out();
        assert_eq!(j.work(), BlockRet::Ok);
        let beat = out.pop().unwrap();
        assert_eq!(beat.payload.get("a").unwrap(), 1);
        assert_eq!(beat.payload.get("b").unwrap(), 2);
    }
}
