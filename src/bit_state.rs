//! `BitState`: explodes one beat into a packet of per-bit observations.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::{Error, Result};

fn bits_needed(width: u32) -> u32 {
    if width <= 1 {
        1
    } else {
        (width - 1).ilog2() + 1
    }
}

enum State {
    Idle,
    Exploding {
        base: Record,
        idx: u32,
        orig_first: bool,
        orig_last: bool,
    },
}

/// Explodes each input beat into a packet of `W = ceil(log2(field_width))`
/// output beats (clamped to a minimum of 1). Each output beat carries the
/// bit index `0..W-1` in `field` and that bit's value in `state_field`;
/// all other fields are copied unchanged.
pub struct BitState {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    field: String,
    state_field: String,
    width: u32,
    w: u32,
    state: State,
}

impl BitState {
    /// Create a new `BitState` over `field` of `in_layout`.
    pub fn new(input: ReadStream<Record>, in_layout: &Layout, field: &str, state_field: &str) -> Result<Self> {
        let width = in_layout.width(field)?;
        if width == 0 {
            return Err(Error::ZeroSizedEnumeration(field.to_string()));
        }
        let out_layout = Arc::new(in_layout.concat(&Layout::new(vec![(state_field, 1)])?)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            field: field.to_string(),
            state_field: state_field.to_string(),
            width,
            w: bits_needed(width),
            state: State::Idle,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for BitState {
    fn block_name(&self) -> &str {
        "BitState"
    }
}

impl BlockEOF for BitState {
    fn eof(&mut self) -> bool {
        matches!(self.state, State::Idle) && self.input.eof()
    }
}

impl Block for BitState {
    fn work(&mut self) -> BlockRet {
        match &mut self.state {
            State::Idle => match self.input.pop() {
                Some(beat) => {
                    self.state = State::Exploding {
                        base: beat.payload,
                        idx: 0,
                        orig_first: beat.first,
                        orig_last: beat.last,
                    };
                    BlockRet::Ok
                }
                None => {
                    if self.input.eof() {
                        BlockRet::EOF
                    } else {
                        BlockRet::Noop
                    }
                }
            },
            State::Exploding { base, idx, orig_first, orig_last } => {
                if self.output.is_full() {
                    return BlockRet::Noop;
                }
                let field_value = base.get(&self.field).unwrap();
                let bit = if *idx < self.width { (field_value >> *idx) & 1 } else { 0 };
                let mut rec = Record::zero(self.out_layout.clone());
                for (name, _) in base.layout().fields() {
                    rec.set(name, base.get(name).unwrap()).unwrap();
                }
                rec.set(&self.field, *idx as u64).unwrap();
                rec.set(&self.state_field, bit).unwrap();
                let is_first = *idx == 0 && *orig_first;
                let is_last = *idx + 1 == self.w && *orig_last;
                self.output.push(Beat {
                    payload: rec,
                    first: is_first,
                    last: is_last,
                });
                *idx += 1;
                if *idx == self.w {
                    self.state = State::Idle;
                }
                BlockRet::Ok
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explodes_into_one_beat_per_bit() {
        let layout = Layout::new(vec![("field", 8)]).unwrap();
        let (w, r) = crate::stream::new_stream::<Record>(16);
        let mut rec = Record::zero(Arc::new(layout.clone()));
        rec.set("field", 0b0000_0101).unwrap();
        w.push(Beat::single(rec));
        drop(w);
        let mut bs = BitState::new(r, &layout, "field", "state").unwrap();
        let out = bs.out();
        while bs.work() != BlockRet::EOF {}
        let beats: Vec<_> = std::iter::from_fn(|| out.pop()).collect();
        assert_eq!(beats.len(), 3); // ceil(log2(8)) = 3
        assert_eq!(beats[0].payload.get("state").unwrap(), 1);
        assert_eq!(beats[1].payload.get("state").unwrap(), 0);
        assert_eq!(beats[2].payload.get("state").unwrap(), 1);
        assert!(beats[0].first && beats[2].last);
    }

    #[test]
    fn clamps_single_bit_fields_to_width_one() {
        assert_eq!(bits_needed(1), 1);
    }
}
