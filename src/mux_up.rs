//! `MuxUp`: accumulates narrow beats into a wider beat, MSB-first.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{mask, Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::{Error, Result};

enum State {
    Acc,
    Flush(Beat<Record>),
}

/// Accumulates up to `ceil(ow/iw)` input beats into a single `ow`-bit
/// output beat, shifting in MSB-first. A received `last` flushes early
/// with the remaining low bits zero-padded.
pub struct MuxUp {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    i_width: u32,
    o_width: u32,
    nibbles: u32,
    sr: u64,
    count: u32,
    first_flag: bool,
    state: State,
}

impl MuxUp {
    /// Create a new `MuxUp` accumulating `i_width`-bit beats into
    /// `o_width`-bit beats. Errors if `o_width < i_width`.
    pub fn new(input: ReadStream<Record>, i_width: u32, o_width: u32) -> Result<Self> {
        if o_width < i_width {
            return Err(Error::WidthMismatch(format!(
                "MuxUp: output width {o_width} smaller than input width {i_width}"
            )));
        }
        let nibbles = o_width.div_ceil(i_width);
        let out_layout = Arc::new(Layout::data(o_width)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            i_width,
            o_width,
            nibbles,
            sr: 0,
            count: 0,
            first_flag: false,
            state: State::Acc,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for MuxUp {
    fn block_name(&self) -> &str {
        "MuxUp"
    }
}

impl BlockEOF for MuxUp {
    fn eof(&mut self) -> bool {
        matches!(self.state, State::Acc) && self.count == 0 && self.input.eof()
    }
}

impl Block for MuxUp {
    fn work(&mut self) -> BlockRet {
        if let State::Flush(_) = &self.state {
            if self.output.is_full() {
                return BlockRet::Noop;
            }
            if let State::Flush(beat) = std::mem::replace(&mut self.state, State::Acc) {
                self.output.push(beat);
            }
            return BlockRet::Ok;
        }
        match self.input.pop() {
            Some(beat) => {
                let v = beat.payload.get("data").expect("MuxUp input must have a data field");
                self.sr = (self.sr << self.i_width) | (v & mask(self.i_width));
                if self.count == 0 {
                    self.first_flag = beat.first;
                }
                self.count += 1;
                if self.count == self.nibbles || beat.last {
                    let pad = self.nibbles - self.count;
                    let final_sr = self.sr << (self.i_width * pad);
                    let mut rec = Record::zero(self.out_layout.clone());
                    rec.set("data", final_sr & mask(self.o_width)).unwrap();
                    self.state = State::Flush(Beat {
                        payload: rec,
                        first: self.first_flag,
                        last: beat.last,
                    });
                    self.sr = 0;
                    self.count = 0;
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

    #[test]
    fn accumulates_msb_first() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(16);
        for b in to_packet(&[0x01u64, 0x02, 0x03, 0x04]) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut m = MuxUp::new(r, 8, 16).unwrap();
        let out = m.out();
        while m.work() != BlockRet::EOF {}
        let vals: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(vals, vec![0x0102, 0x0304]);
    }
}
