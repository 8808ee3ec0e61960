//! `Sink`: drops everything, always ready.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::stream::ReadStream;

/// Consumes and discards every beat from `input` as fast as it arrives.
pub struct Sink<T> {
    input: ReadStream<T>,
}

impl<T> Sink<T> {
    /// Create a new `Sink` reading from `input`.
    pub fn new(input: ReadStream<T>) -> Self {
        Self { input }
    }
}

impl<T> BlockName for Sink<T> {
    fn block_name(&self) -> &str {
        "Sink"
    }
}

impl<T> BlockEOF for Sink<T> {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}

impl<T: Send> Block for Sink<T> {
    fn work(&mut self) -> BlockRet {
        match self.input.pop() {
            Some(_) => BlockRet::Ok,
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
    use crate::layout::Beat;
    use crate::stream::new_stream;

    #[test]
    fn drains_to_eof() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(1));
        drop(w);
        let mut s = Sink::new(r);
        assert_eq!(s.work(), BlockRet::Ok);
        assert_eq!(s.work(), BlockRet::EOF);
    }
}
