//! `UnaryOp` family: one output beat per input beat, each with a named
//! field transformed and the rest copied.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{mask, sign_extend, Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::{Error, Result};

fn copy_fields(src: &Record, dst_layout: Arc<Layout>) -> Record {
    let mut dst = Record::zero(dst_layout);
    for (name, _) in src.layout().fields() {
        if dst.layout().has_field(name) {
            dst.set(name, src.get(name).unwrap()).unwrap();
        }
    }
    dst
}

/// Signed absolute value of one or more named fields; other fields copied.
pub struct Abs {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    layout: Arc<Layout>,
    fields: Vec<(String, u32)>,
}

impl Abs {
    /// Create a new `Abs` over `fields` of `layout`.
    pub fn new(input: ReadStream<Record>, layout: Arc<Layout>, fields: &[&str]) -> Result<Self> {
        let mut resolved = Vec::with_capacity(fields.len());
        for f in fields {
            resolved.push((f.to_string(), layout.width(f)?));
        }
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            layout,
            fields: resolved,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Abs {
    fn block_name(&self) -> &str {
        "Abs"
    }
}
impl BlockEOF for Abs {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for Abs {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                let mut rec = copy_fields(&beat.payload, self.layout.clone());
                for (name, width) in &self.fields {
                    let v = beat.payload.get(name).unwrap();
                    let abs = sign_extend(v, *width).unsigned_abs();
                    rec.set(name, abs & mask(*width)).unwrap();
                }
                self.output.push(Beat {
                    payload: rec,
                    first: beat.first,
                    last: beat.last,
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

/// Forwards a beat only when at least one targeted field changed vs. the
/// previously forwarded beat. Packet framing is not preserved: every
/// emitted beat is its own single-element packet.
pub struct Delta {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    fields: Vec<String>,
    prev: Option<Vec<u64>>,
}

impl Delta {
    /// Create a new `Delta` watching `fields` for changes.
    pub fn new(input: ReadStream<Record>, fields: &[&str]) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            fields: fields.iter().map(|s| s.to_string()).collect(),
            prev: None,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Delta {
    fn block_name(&self) -> &str {
        "Delta"
    }
}
impl BlockEOF for Delta {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for Delta {
    fn work(&mut self) -> BlockRet {
        match self.input.pop() {
            Some(beat) => {
                let values: Vec<u64> = self.fields.iter().map(|f| beat.payload.get(f).unwrap()).collect();
                let changed = self.prev.as_ref() != Some(&values);
                self.prev = Some(values);
                if changed {
                    if self.output.is_full() {
                        return BlockRet::Noop;
                    }
                    self.output.push(Beat::single(beat.payload));
                }
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

/// Position of the highest (or, if `any`, the lowest) set bit of `field`;
/// emitted only when some bit is set. Other fields copied.
pub struct BitToN {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    layout: Arc<Layout>,
    field: String,
    any: bool,
}

impl BitToN {
    /// Create a new `BitToN` over `field` of `layout`.
    pub fn new(input: ReadStream<Record>, layout: Arc<Layout>, field: &str, any: bool) -> Result<Self> {
        layout.width(field)?;
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            layout,
            field: field.to_string(),
            any,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for BitToN {
    fn block_name(&self) -> &str {
        "BitToN"
    }
}
impl BlockEOF for BitToN {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for BitToN {
    fn work(&mut self) -> BlockRet {
        match self.input.pop() {
            Some(beat) => {
                let v = beat.payload.get(&self.field).unwrap();
                if v == 0 {
                    return BlockRet::Ok;
                }
                if self.output.is_full() {
                    return BlockRet::Noop;
                }
                let pos = if self.any { v.trailing_zeros() } else { 63 - v.leading_zeros() };
                let mut rec = copy_fields(&beat.payload, self.layout.clone());
                rec.set(&self.field, pos as u64).unwrap();
                self.output.push(Beat {
                    payload: rec,
                    first: beat.first,
                    last: beat.last,
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

/// Forwards every `n`-th beat.
pub struct Decimate {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    n: u64,
    count: u64,
}

impl Decimate {
    /// Create a new `Decimate` forwarding every `n`-th beat. Errors if
    /// `n <= 1`.
    pub fn new(input: ReadStream<Record>, n: u64) -> Result<Self> {
        if n <= 1 {
            return Err(Error::BadDecimateFactor(n));
        }
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            n,
            count: 0,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Decimate {
    fn block_name(&self) -> &str {
        "Decimate"
    }
}
impl BlockEOF for Decimate {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for Decimate {
    fn work(&mut self) -> BlockRet {
        let would_forward = self.count + 1 == self.n;
        if would_forward && self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                self.count += 1;
                if self.count == self.n {
                    self.count = 0;
                    self.output.push(beat);
                }
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

/// Appends a running index field, restarting at 0 after each packet
/// `last`.
pub struct Enumerate {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    idx_field: String,
    offset: u64,
    idx: u64,
}

impl Enumerate {
    /// Create a new `Enumerate` appending `idx_field` (`idx_width` bits,
    /// starting at `offset`) to `in_layout`.
    pub fn new(
        input: ReadStream<Record>,
        in_layout: &Layout,
        idx_field: &str,
        idx_width: u32,
        offset: u64,
    ) -> Result<Self> {
        let out_layout = Arc::new(in_layout.concat(&Layout::new(vec![(idx_field, idx_width)])?)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            idx_field: idx_field.to_string(),
            offset,
            idx: 0,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Enumerate {
    fn block_name(&self) -> &str {
        "Enumerate"
    }
}
impl BlockEOF for Enumerate {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for Enumerate {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                let mut rec = copy_fields(&beat.payload, self.out_layout.clone());
                rec.set(&self.idx_field, self.offset.wrapping_add(self.idx)).unwrap();
                self.idx += 1;
                if beat.last {
                    self.idx = 0;
                }
                self.output.push(Beat {
                    payload: rec,
                    first: beat.first,
                    last: beat.last,
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
    use crate::layout::to_packet;

    #[test]
    fn decimate_forwards_every_nth_beat() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(16);
        for v in 1..=6u64 {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", v).unwrap();
            w.push(Beat::single(rec));
        }
        drop(w);
        let mut d = Decimate::new(r, 3).unwrap();
        let out = d.out();
        while d.work() != BlockRet::EOF {}
        let vals: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(vals, vec![3, 6]);
    }

    #[test]
    fn enumerate_restarts_per_packet() {
        let layout = Layout::data(8).unwrap();
        let (w, r) = crate::stream::new_stream::<Record>(16);
        let arc_layout = Arc::new(layout.clone());
        for b in to_packet(&[10u64, 20]) {
            let mut rec = Record::zero(arc_layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut e = Enumerate::new(r, &layout, "idx", 4, 0).unwrap();
        let out = e.out();
        while e.work() != BlockRet::EOF {}
        let idxs: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("idx").unwrap()).collect();
        assert_eq!(idxs, vec![0, 1]);
    }
}
