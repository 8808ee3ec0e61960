//! `Split`: fans one record stream out into one scalar stream per field.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};

/// One output stream per payload field of `layout`; each transfer fans
/// out to every field simultaneously, and each output is consumed
/// independently (conservative union readiness, as in [`crate::tee::Tee`]).
pub struct Split {
    input: ReadStream<Record>,
    field_names: Vec<String>,
    outputs: Vec<WriteStream<u64>>,
    out_rs: Vec<ReadStream<u64>>,
    pending: Option<Beat<Record>>,
    delivered: Vec<bool>,
}

impl Split {
    /// Create a new `Split` over `layout`'s fields.
    pub fn new(input: ReadStream<Record>, layout: &Layout) -> Self {
        let field_names: Vec<String> = layout.fields().iter().map(|(n, _)| n.clone()).collect();
        let n = field_names.len();
        let mut outputs = Vec::with_capacity(n);
        let mut out_rs = Vec::with_capacity(n);
        for _ in 0..n {
            let (w, r) = WriteStream::new();
            outputs.push(w);
            out_rs.push(r);
        }
        Self {
            input,
            field_names,
            outputs,
            out_rs,
            pending: None,
            delivered: vec![false; n],
        }
    }

    /// The output stream for a named field.
    #[must_use]
    pub fn out(&self, field: &str) -> Option<ReadStream<u64>> {
        self.field_names
            .iter()
            .position(|n| n == field)
            .map(|i| self.out_rs[i].clone())
    }
}

impl BlockName for Split {
    fn block_name(&self) -> &str {
        "Split"
    }
}

impl BlockEOF for Split {
    fn eof(&mut self) -> bool {
        self.pending.is_none() && self.input.eof()
    }
}

impl Block for Split {
    fn work(&mut self) -> BlockRet {
        if self.pending.is_none() {
            return match self.input.pop() {
                Some(beat) => {
                    self.pending = Some(beat);
                    self.delivered.iter_mut().for_each(|d| *d = false);
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
        let beat = self.pending.as_ref().unwrap();
        let mut delivered_this_call = false;
        for (i, name) in self.field_names.iter().enumerate() {
            if !self.delivered[i] && !self.outputs[i].is_full() {
                let value = beat.payload.get(name).expect("field present by construction");
                self.outputs[i].push(Beat {
                    payload: value,
                    first: beat.first,
                    last: beat.last,
                });
                self.delivered[i] = true;
                delivered_this_call = true;
            }
        }
        if self.delivered.iter().all(|&d| d) {
            self.pending = None;
        }
        if delivered_this_call {
            BlockRet::Ok
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
    fn fans_out_one_stream_per_field() {
        let layout = Layout::new(vec![("a", 8), ("b", 8)]).unwrap();
        let (w, r) = new_stream::<Record>(4);
        let mut rec = Record::zero(Arc::new(layout.clone()));
        rec.set("a", 1).unwrap();
        rec.set("b", 2).unwrap();
        w.push(Beat::single(rec));
        drop(w);
        let mut s = Split::new(r, &layout);
        let a = s.out("a").unwrap();
        let b = s.out("b").unwrap();
        while s.work() != BlockRet::EOF {}
        assert_eq!(a.pop().unwrap().payload, 1);
        assert_eq!(b.pop().unwrap().payload, 2);
    }
}
