//! `MuxDown`: serializes a wide beat into narrower beats, LSB-first.
use std::sync::Arc;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{mask, Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::{Error, Result};

/// Serializes one `iw`-bit input beat into `iw/ow` consecutive `ow`-bit
/// output beats, LSB first. The input's `first` maps to the first output
/// beat; `last` maps to the final one.
pub struct MuxDown {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    out_layout: Arc<Layout>,
    o_width: u32,
    nibbles: u32,
    sr: u64,
    idx: u32,
    active: bool,
    first_flag: bool,
    last_flag: bool,
}

impl MuxDown {
    /// Create a new `MuxDown` from an `iw`-bit field `data` down to `ow`
    /// bits. Errors unless `iw` is a positive multiple of `ow`.
    pub fn new(input: ReadStream<Record>, i_width: u32, o_width: u32) -> Result<Self> {
        if o_width == 0 || i_width % o_width != 0 {
            return Err(Error::WidthMismatch(format!(
                "MuxDown: {i_width} is not a multiple of {o_width}"
            )));
        }
        let nibbles = i_width / o_width;
        let out_layout = Arc::new(Layout::data(o_width)?);
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            out_layout,
            o_width,
            nibbles,
            sr: 0,
            idx: 0,
            active: false,
            first_flag: false,
            last_flag: false,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
}

impl BlockName for MuxDown {
    fn block_name(&self) -> &str {
        "MuxDown"
    }
}

impl BlockEOF for MuxDown {
    fn eof(&mut self) -> bool {
        !self.active && self.input.eof()
    }
}

impl Block for MuxDown {
    fn work(&mut self) -> BlockRet {
        if !self.active {
            return match self.input.pop() {
                Some(beat) => {
                    self.sr = beat.payload.get("data").expect("MuxDown input must have a data field");
                    self.idx = 0;
                    self.first_flag = beat.first;
                    self.last_flag = beat.last;
                    self.active = true;
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
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let chunk = self.sr & mask(self.o_width);
        self.sr >>= self.o_width;
        let is_first_chunk = self.idx == 0;
        let is_last_chunk = self.idx + 1 == self.nibbles;
        let mut rec = Record::zero(self.out_layout.clone());
        rec.set("data", chunk).unwrap();
        self.output.push(Beat {
            payload: rec,
            first: is_first_chunk && self.first_flag,
            last: is_last_chunk && self.last_flag,
        });
        self.idx += 1;
        if self.idx == self.nibbles {
            self.active = false;
        }
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::to_packet;
    use std::sync::Arc as StdArc;

    #[test]
    fn serializes_lsb_first() {
        let layout = StdArc::new(Layout::data(32).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(16);
        for b in to_packet(&[0x1234_5678u64, 0x1122_3344]) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut m = MuxDown::new(r, 32, 8).unwrap();
        let out = m.out();
        while m.work() != BlockRet::EOF {}
        let vals: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(
            vals,
            vec![0x78, 0x56, 0x34, 0x12, 0x44, 0x33, 0x22, 0x11]
        );
    }
}
