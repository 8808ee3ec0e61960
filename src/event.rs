//! `Event`: a passive tap that forwards data unchanged while emitting
//! zero-payload pulses on packet boundaries.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Record};
use crate::stream::{ReadStream, WriteStream};

/// Taps `input`, forwarding it unchanged to `o`, while also emitting a
/// zero-payload beat on `o_first` (when `first`), `o_last` (when `last`),
/// and `o_data` (on every transfer).
pub struct Event {
    input: ReadStream<Record>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    o_first: WriteStream<()>,
    o_first_r: ReadStream<()>,
    o_last: WriteStream<()>,
    o_last_r: ReadStream<()>,
    o_data: WriteStream<()>,
    o_data_r: ReadStream<()>,
}

impl Event {
    /// Create a new `Event` tapping `input`.
    pub fn new(input: ReadStream<Record>) -> Self {
        let (output, out_r) = WriteStream::new();
        let (o_first, o_first_r) = WriteStream::new();
        let (o_last, o_last_r) = WriteStream::new();
        let (o_data, o_data_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            o_first,
            o_first_r,
            o_last,
            o_last_r,
            o_data,
            o_data_r,
        }
    }

    /// The unchanged passthrough of `input`.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }
    /// Pulses once per packet start.
    #[must_use]
    pub fn o_first(&self) -> ReadStream<()> {
        self.o_first_r.clone()
    }
    /// Pulses once per packet end.
    #[must_use]
    pub fn o_last(&self) -> ReadStream<()> {
        self.o_last_r.clone()
    }
    /// Pulses once per transfer.
    #[must_use]
    pub fn o_data(&self) -> ReadStream<()> {
        self.o_data_r.clone()
    }
}

impl BlockName for Event {
    fn block_name(&self) -> &str {
        "Event"
    }
}

impl BlockEOF for Event {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}

impl Block for Event {
    fn work(&mut self) -> BlockRet {
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        match self.input.pop() {
            Some(beat) => {
                if beat.first {
                    self.o_first.push(Beat::single(()));
                }
                if beat.last {
                    self.o_last.push(Beat::single(()));
                }
                self.o_data.push(Beat::single(()));
                self.output.push(beat);
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
    use crate::layout::{to_packet, Layout};
    use crate::stream::new_stream;
    use std::sync::Arc;

    #[test]
    fn emits_pulses_on_boundaries() {
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
        let mut e = Event::new(r);
        let data = e.o_data();
        let first = e.o_first();
        let last = e.o_last();
        while e.work() != BlockRet::EOF {}
        assert_eq!(data.len(), 3);
        assert_eq!(first.len(), 1);
        assert_eq!(last.len(), 1);
    }
}
