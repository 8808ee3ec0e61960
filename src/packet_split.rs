//! `PacketSplit`: the dual of `Collator` — captures a whole `n`-beat
//! packet and fans it out one field per output.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Record};
use crate::stream::{ReadStream, WriteStream};

/// Reads one whole packet of exactly `n` beats from `input` and emits it
/// as `n` independently consumed scalar outputs, `o[0]..o[n-1]` holding
/// the packet's beats in order. Grounded in `route.py`'s `PacketSplit`,
/// which shares `Head`'s single-packet-capture state machine.
pub struct PacketSplit {
    input: ReadStream<Record>,
    data_field: String,
    n: usize,
    captured: Vec<u64>,
    have_packet: bool,
    outputs: Vec<WriteStream<u64>>,
    out_rs: Vec<ReadStream<u64>>,
    delivered: Vec<bool>,
}

impl PacketSplit {
    /// Create a new `PacketSplit` expecting `n`-beat packets.
    pub fn new(input: ReadStream<Record>, data_field: &str, n: usize) -> Self {
        let mut outputs = Vec::with_capacity(n);
        let mut out_rs = Vec::with_capacity(n);
        for _ in 0..n {
            let (w, r) = WriteStream::new();
            outputs.push(w);
            out_rs.push(r);
        }
        Self {
            input,
            data_field: data_field.to_string(),
            n,
            captured: Vec::with_capacity(n),
            have_packet: false,
            outputs,
            out_rs,
            delivered: vec![false; n],
        }
    }

    /// The output stream carrying the packet's `i`-th beat.
    #[must_use]
    pub fn out(&self, i: usize) -> ReadStream<u64> {
        self.out_rs[i].clone()
    }
}

impl BlockName for PacketSplit {
    fn block_name(&self) -> &str {
        "PacketSplit"
    }
}

impl BlockEOF for PacketSplit {
    fn eof(&mut self) -> bool {
        !self.have_packet && self.captured.is_empty() && self.input.eof()
    }
}

impl Block for PacketSplit {
    fn work(&mut self) -> BlockRet {
        if !self.have_packet {
            match self.input.pop() {
                Some(beat) => {
                    let value = beat
                        .payload
                        .get(&self.data_field)
                        .expect("data_field must exist in input layout");
                    if self.captured.len() < self.n {
                        self.captured.push(value);
                    }
                    if beat.last || self.captured.len() == self.n {
                        while self.captured.len() < self.n {
                            self.captured.push(0);
                        }
                        self.have_packet = true;
                        self.delivered.iter_mut().for_each(|d| *d = false);
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
            let mut progressed = false;
            for i in 0..self.n {
                if !self.delivered[i] && !self.outputs[i].is_full() {
                    self.outputs[i].push(Beat::single(self.captured[i]));
                    self.delivered[i] = true;
                    progressed = true;
                }
            }
            if self.delivered.iter().all(|&d| d) {
                self.have_packet = false;
                self.captured.clear();
            }
            if progressed {
                BlockRet::Ok
            } else {
                BlockRet::Noop
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
    fn captures_a_packet_and_fans_it_out() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = new_stream::<Record>(8);
        for b in to_packet(&[1u64, 2, 3]) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut ps = PacketSplit::new(r, "data", 3);
        let outs: Vec<_> = (0..3).map(|i| ps.out(i)).collect();
        while ps.work() != BlockRet::EOF {}
        assert_eq!(outs[0].pop().unwrap().payload, 1);
        assert_eq!(outs[1].pop().unwrap().payload, 2);
        assert_eq!(outs[2].pop().unwrap().payload, 3);
    }
}
