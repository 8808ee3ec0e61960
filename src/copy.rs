//! `Copy`: a single-beat registered buffer.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// A one-deep registered buffer. Latches a beat from `input`, deasserts
/// readiness, and holds it until `output` accepts it. Throughput is one
/// transfer per two cycles worst case.
pub struct Copy<T> {
    input: ReadStream<T>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    held: Option<Beat<T>>,
}

impl<T: Clone> Copy<T> {
    /// Create a new `Copy` reading from `input`.
    pub fn new(input: ReadStream<T>) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            input,
            output,
            out_r,
            held: None,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }
}

impl<T> BlockName for Copy<T> {
    fn block_name(&self) -> &str {
        "Copy"
    }
}

impl<T> BlockEOF for Copy<T> {
    fn eof(&mut self) -> bool {
        self.held.is_none() && self.input.eof()
    }
}

impl<T: Clone + Send> Block for Copy<T> {
    fn work(&mut self) -> BlockRet {
        if let Some(beat) = self.held.take() {
            if self.output.is_full() {
                self.held = Some(beat);
                return BlockRet::Noop;
            }
            self.output.push(beat);
            return BlockRet::Ok;
        }
        match self.input.pop() {
            Some(beat) => {
                self.held = Some(beat);
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
    use crate::stream::new_stream;

    #[test]
    fn forwards_beats_in_order() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(1));
        w.push(Beat::single(2));
        drop(w);
        let mut c = Copy::new(r);
        let out = c.out();
        while c.work() != BlockRet::EOF {}
        assert_eq!(out.pop().unwrap().payload, 1);
        assert_eq!(out.pop().unwrap().payload, 2);
    }
}
