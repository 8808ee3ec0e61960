//! `Head`: captures the first `n` transfers of each packet into a table,
//! then forwards the remainder.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// Consumes the first `n` transfers of each packet on `input`, storing
/// their `data_field` values into `head()`, then forwards the rest of the
/// packet to `o` with `first` re-asserted on the first forwarded beat. If
/// a packet ends before `n` beats, `head()` holds a partial prefix and
/// nothing is forwarded for that packet.
pub struct Head {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    data_field: String,
    n: usize,
    head: Vec<u64>,
    forwarding: bool,
    first_pending: bool,
    have_valid_head: bool,
}

impl Head {
    /// Create a new `Head` capturing `n` beats' worth of `data_field`.
    pub fn new(input: ReadStream<Record>, data_field: &str, n: usize) -> Result<Self> {
        let (output, out_r) = WriteStream::new();
        Ok(Self {
            input,
            output,
            out_r,
            data_field: data_field.to_string(),
            n,
            head: Vec::with_capacity(n),
            forwarding: false,
            first_pending: false,
            have_valid_head: false,
        })
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }

    /// The captured head values of the most recently completed packet.
    #[must_use]
    pub fn head(&self) -> &[u64] {
        &self.head
    }

    /// True while the remainder of a packet is still being forwarded.
    #[must_use]
    pub fn more(&self) -> bool {
        self.forwarding
    }

    /// True once `n` head values have been captured for the current packet.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.have_valid_head
    }
}

impl BlockName for Head {
    fn block_name(&self) -> &str {
        "Head"
    }
}

impl BlockEOF for Head {
    fn eof(&mut self) -> bool {
        !self.forwarding && self.input.eof()
    }
}

impl Block for Head {
    fn work(&mut self) -> BlockRet {
        if !self.forwarding {
            match self.input.pop() {
                Some(beat) => {
                    if beat.first {
                        self.head.clear();
                        self.have_valid_head = false;
                    }
                    let value = beat
                        .payload
                        .get(&self.data_field)
                        .expect("data_field must exist in input layout");
                    if self.head.len() < self.n {
                        self.head.push(value);
                    }
                    if beat.last {
                        self.have_valid_head = self.head.len() == self.n;
                        return BlockRet::Ok;
                    }
                    if self.head.len() == self.n {
                        self.have_valid_head = true;
                        self.forwarding = true;
                        self.first_pending = true;
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
        } else {
            if self.output.is_full() {
                return BlockRet::Noop;
            }
            match self.input.pop() {
                Some(beat) => {
                    let first = self.first_pending;
                    self.first_pending = false;
                    let last = beat.last;
                    self.output.push(Beat {
                        payload: beat.payload,
                        first,
                        last,
                    });
                    if last {
                        self.forwarding = false;
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{to_packet, Layout};
    use crate::stream::new_stream;
    use std::sync::Arc;

    #[test]
    fn captures_head_and_forwards_remainder() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = new_stream::<Record>(16);
        for b in to_packet(&[16u64, 4, 5, 6, 7, 8]) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut h = Head::new(r, "data", 3).unwrap();
        let out = h.out();
        while h.work() != BlockRet::EOF {}
        assert_eq!(h.head(), &[16, 4, 5]);
        let beats: Vec<_> = std::iter::from_fn(|| out.pop()).collect();
        let values: Vec<u64> = beats.iter().map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(values, vec![6, 7, 8]);
        assert!(beats[0].first && !beats[0].last);
        assert!(beats[2].last);
    }
}
