//! `BinaryOp` and its algebraic subclasses, plus the packet-reducing `Sum`.
use std::marker::PhantomData;
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{mask, sign_extend, Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// The algebraic step of a [`BinaryOp`]: combine two `iw`-bit operands
/// into one `ow`-bit result.
pub trait BinaryFn: Default + Send {
    /// Human-readable name, used as [`Block::block_name`].
    const NAME: &'static str;
    /// Compute the result for one beat.
    fn apply(a: u64, b: u64, iw: u32, ow: u32) -> u64;
}

/// Unsigned multiply.
#[derive(Default)]
pub struct MulOp;
impl BinaryFn for MulOp {
    const NAME: &'static str = "Mul";
    fn apply(a: u64, b: u64, _iw: u32, ow: u32) -> u64 {
        a.wrapping_mul(b) & mask(ow)
    }
}

/// Unsigned add.
#[derive(Default)]
pub struct AddOp;
impl BinaryFn for AddOp {
    const NAME: &'static str = "Add";
    fn apply(a: u64, b: u64, _iw: u32, ow: u32) -> u64 {
        a.wrapping_add(b) & mask(ow)
    }
}

/// Signed multiply: both operands sign-extended to `iw` bits first.
#[derive(Default)]
pub struct MulSignedOp;
impl BinaryFn for MulSignedOp {
    const NAME: &'static str = "MulSigned";
    fn apply(a: u64, b: u64, iw: u32, ow: u32) -> u64 {
        let a = sign_extend(a, iw);
        let b = sign_extend(b, iw);
        (a.wrapping_mul(b) as u64) & mask(ow)
    }
}

/// Signed add: both operands sign-extended to `iw` bits first.
#[derive(Default)]
pub struct AddSignedOp;
impl BinaryFn for AddSignedOp {
    const NAME: &'static str = "AddSigned";
    fn apply(a: u64, b: u64, iw: u32, ow: u32) -> u64 {
        let a = sign_extend(a, iw);
        let b = sign_extend(b, iw);
        (a.wrapping_add(b) as u64) & mask(ow)
    }
}

/// Pairwise signed maximum. Not present in the retrieved original source;
/// implemented in the idiom of [`BinaryOp`] (see DESIGN.md).
#[derive(Default)]
pub struct MaxSignedOp;
impl BinaryFn for MaxSignedOp {
    const NAME: &'static str = "Max";
    fn apply(a: u64, b: u64, iw: u32, ow: u32) -> u64 {
        let a = sign_extend(a, iw);
        let b = sign_extend(b, iw);
        (a.max(b) as u64) & mask(ow)
    }
}

/// Reads one beat with fields `a, b` (`iw` bits each), computes one output
/// beat `data` (`ow` bits), producing exactly one output per input.
/// `first`/`last` propagate unchanged. The algebraic step is `F`.
pub struct BinaryOp<F> {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    iw: u32,
    ow: u32,
    _op: PhantomData<F>,
}

impl<F: BinaryFn> BinaryOp<F> {
    /// Create a new `BinaryOp` over `iw`-bit `a`/`b` fields, producing an
    /// `ow`-bit `data` field.
    pub fn new(input: ReadStream<Record>, iw: u32, ow: u32) -> Result<Self> {
        let out_layout = Arc::new(Layout::data(ow)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            iw,
            ow,
            _op: PhantomData,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl<F> BlockName for BinaryOp<F> {
    fn block_name(&self) -> &str {
        "BinaryOp"
    }
}

impl<F> BlockEOF for BinaryOp<F> {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}

impl<F: BinaryFn> Block for BinaryOp<F> {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                let a = beat.payload.get("a").expect("BinaryOp input must have field a");
                let b = beat.payload.get("b").expect("BinaryOp input must have field b");
                let result = F::apply(a, b, self.iw, self.ow);
                let mut rec = Record::zero(self.out_layout.clone());
                rec.set("data", result).unwrap();
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

/// Unsigned multiply over a stream of `a, b` beats.
pub type Mul = BinaryOp<MulOp>;
/// Unsigned add over a stream of `a, b` beats.
pub type Add = BinaryOp<AddOp>;
/// Signed multiply over a stream of `a, b` beats.
pub type MulSigned = BinaryOp<MulSignedOp>;
/// Signed add over a stream of `a, b` beats.
pub type AddSigned = BinaryOp<AddSignedOp>;
/// Pairwise signed maximum over a stream of `a, b` beats.
pub type Max = BinaryOp<MaxSignedOp>;

/// Accumulates the `data` field across a packet, resetting on `first` and
/// emitting one output beat (`ow` bits, wrapping modulo `2^ow`) on `last`.
/// `signed` sign-extends each term before accumulating.
pub struct Sum {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    iw: u32,
    ow: u32,
    signed: bool,
    acc: u64,
    pending: Option<Beat<Record>>,
}

impl Sum {
    /// Create a new `Sum`/`SumSigned` accumulator.
    pub fn new(input: ReadStream<Record>, iw: u32, ow: u32, signed: bool) -> Result<Self> {
        let out_layout = Arc::new(Layout::data(ow)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            iw,
            ow,
            signed,
            acc: 0,
            pending: None,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for Sum {
    fn block_name(&self) -> &str {
        "Sum"
    }
}

impl BlockEOF for Sum {
    fn eof(&mut self) -> bool {
        self.pending.is_none() && self.input.eof()
    }
}

impl Block for Sum {
    fn work(&mut self) -> BlockRet {
        if let Some(beat) = self.pending.take() {
            if self.output.is_full() {
                self.pending = Some(beat);
                return BlockRet::Noop;
            }
            self.output.push(beat);
            return BlockRet::Ok;
        }
        match self.input.pop() {
            Some(beat) => {
                let raw = beat.payload.get("data").expect("Sum input must have a data field");
                let v: u64 = if self.signed {
                    sign_extend(raw, self.iw) as u64
                } else {
                    raw
                };
                if beat.first {
                    self.acc = 0;
                }
                self.acc = self.acc.wrapping_add(v);
                if beat.last {
                    let mut rec = Record::zero(self.out_layout.clone());
                    rec.set("data", self.acc & mask(self.ow)).unwrap();
                    self.pending = Some(Beat::single(rec));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_packet;

    fn push_ab(w: &WriteStream<Record>, layout: &Arc<Layout>, a: u64, b: u64, first: bool, last: bool) {
        let mut rec = Record::zero(layout.clone());
        rec.set("a", a).unwrap();
        rec.set("b", b).unwrap();
        w.push(Beat { payload: rec, first, last });
    }

    #[test]
    fn mul_multiplies_unsigned_operands() {
        let layout = Arc::new(Layout::new(vec![("a", 8), ("b", 8)]).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(4);
        push_ab(&w, &layout, 6, 7, true, true);
        drop(w);
        let mut m = Mul::new(r, 8, 16).unwrap();
        let out = m.out();
        m.work();
        assert_eq!(out.pop().unwrap().payload.get("data").unwrap(), 42);
    }

    #[test]
    fn sum_signed_accumulates_a_packet() {
        let layout = Arc::new(Layout::data(16).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(16);
        let values: [i64; 7] = [1, -2, 4, -8, 16, -32, 64];
        for b in to_packet(&values) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload as u64 & mask(16)).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut s = Sum::new(r, 16, 32, true).unwrap();
        let out = s.out();
        while s.work() != BlockRet::EOF {}
        let beat = out.pop().unwrap();
        assert_eq!(beat.payload.get("data").unwrap(), 43);
        assert!(beat.first && beat.last);
    }
}
