//! `Router`: consumes each packet's address beat, then forwards the rest
//! to the matching output or to the error output.
use std::collections::HashMap;

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Record};
use crate::stream::{ReadStream, WriteStream};

enum State {
    Idle,
    Copy { target: Option<usize>, first_pending: bool },
}

/// Cascades a length-1 `Head` in front of a 1-of-k+1 demultiplexer: the
/// first beat of each packet is consumed as an address, and the remaining
/// beats are forwarded to `o[addr]` if the address matches one of `addrs`,
/// or to the error output otherwise.
pub struct Router {
    input: ReadStream<Record>,
    addr_field: String,
    addr_index: HashMap<u64, usize>,
    outputs: Vec<WriteStream<Record>>,
    out_rs: Vec<ReadStream<Record>>,
    error: WriteStream<Record>,
    error_r: ReadStream<Record>,
    state: State,
}

impl Router {
    /// Create a new `Router` on `addr_field`, with one output per entry of
    /// `addrs` plus an error output for unmatched addresses.
    pub fn new(input: ReadStream<Record>, addr_field: &str, addrs: &[u64]) -> Self {
        let mut outputs = Vec::with_capacity(addrs.len());
        let mut out_rs = Vec::with_capacity(addrs.len());
        let mut addr_index = HashMap::new();
        for (i, a) in addrs.iter().enumerate() {
            let (w, r) = WriteStream::new();
            outputs.push(w);
            out_rs.push(r);
            addr_index.insert(*a, i);
        }
        let (error, error_r) = WriteStream::new();
        Self {
            input,
            addr_field: addr_field.to_string(),
            addr_index,
            outputs,
            out_rs,
            error,
            error_r,
            state: State::Idle,
        }
    }

    /// The output stream routed for address `addr`, if configured.
    #[must_use]
    pub fn out(&self, addr: u64) -> Option<ReadStream<Record>> {
        self.addr_index.get(&addr).map(|&i| self.out_rs[i].clone())
    }

    /// The error output, carrying packets whose address matched nothing.
    #[must_use]
    pub fn err(&self) -> ReadStream<Record> {
        self.error_r.clone()
    }
}

impl BlockName for Router {
    fn block_name(&self) -> &str {
        "Router"
    }
}

impl BlockEOF for Router {
    fn eof(&mut self) -> bool {
        matches!(self.state, State::Idle) && self.input.eof()
    }
}

impl Block for Router {
    fn work(&mut self) -> BlockRet {
        match self.state {
            State::Idle => match self.input.pop() {
                Some(beat) => {
                    let addr = beat
                        .payload
                        .get(&self.addr_field)
                        .expect("addr_field must exist in input layout");
                    let target = self.addr_index.get(&addr).copied();
                    if !beat.last {
                        self.state = State::Copy {
                            target,
                            first_pending: true,
                        };
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
            },
            State::Copy { target, first_pending } => {
                let out = match target {
                    Some(i) => &mut self.outputs[i],
                    None => &mut self.error,
                };
                if out.is_full() {
                    return BlockRet::Noop;
                }
                match self.input.pop() {
                    Some(beat) => {
                        let last = beat.last;
                        out.push(Beat {
                            payload: beat.payload,
                            first: first_pending,
                            last,
                        });
                        if last {
                            self.state = State::Idle;
                        } else {
                            self.state = State::Copy { target, first_pending: false };
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{to_packet, Layout};
    use std::sync::Arc;

    fn push_packet(w: &WriteStream<Record>, layout: &Arc<crate::layout::Layout>, values: &[u64]) {
        for b in to_packet(values) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
    }

    #[test]
    fn routes_packets_by_leading_address() {
        let layout = Arc::new(Layout::data(16).unwrap());
        let (w, r) = new_stream_data(16);
        push_packet(&w, &layout, &[1, 2, 3, 4]);
        push_packet(&w, &layout, &[0x10, 5, 6]);
        push_packet(&w, &layout, &[0x99, 7]);
        drop(w);
        let mut router = Router::new(r, "data", &[1, 0x10]);
        let o1 = router.out(1).unwrap();
        let o10 = router.out(0x10).unwrap();
        let e = router.err();
        while router.work() != BlockRet::EOF {}
        let v1: Vec<u64> = std::iter::from_fn(|| o1.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        let v10: Vec<u64> = std::iter::from_fn(|| o10.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        let ve: Vec<u64> = std::iter::from_fn(|| e.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(v1, vec![2, 3, 4]);
        assert_eq!(v10, vec![5, 6]);
        assert_eq!(ve, vec![7]);
    }

    fn new_stream_data(cap: usize) -> (WriteStream<Record>, ReadStream<Record>) {
        crate::stream::new_stream(cap)
    }
}
