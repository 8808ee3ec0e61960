//! `Select`: a programmable mux over `n` inputs.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::stream::{ReadStream, WriteStream};

/// A programmable mux. The active input is named by [`Select::set_select`].
/// If `sink` is set, non-selected inputs are drained (dropped) instead of
/// backpressured. If `wait_last` is set, a packet already in flight on the
/// previously selected input is allowed to finish before the switch takes
/// effect.
pub struct Select<T> {
    inputs: Vec<ReadStream<T>>,
    output: WriteStream<T>,
    out_r: ReadStream<T>,
    select: usize,
    sink: bool,
    wait_last: bool,
    draining: Option<usize>,
}

impl<T: Clone> Select<T> {
    /// Create a new `Select` over `inputs`, initially routing input 0.
    pub fn new(inputs: Vec<ReadStream<T>>, sink: bool, wait_last: bool) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            inputs,
            output,
            out_r,
            select: 0,
            sink,
            wait_last,
            draining: None,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<T> {
        self.out_r.clone()
    }

    /// Switch the active input.
    pub fn set_select(&mut self, idx: usize) {
        if self.wait_last && self.draining.is_none() && idx != self.select {
            self.draining = Some(self.select);
        }
        self.select = idx;
    }
}

impl<T> BlockName for Select<T> {
    fn block_name(&self) -> &str {
        "Select"
    }
}

impl<T> BlockEOF for Select<T> {
    fn eof(&mut self) -> bool {
        self.inputs.iter().all(|s| s.eof())
    }
}

impl<T: Clone + Send> Block for Select<T> {
    fn work(&mut self) -> BlockRet {
        let active = self.draining.unwrap_or(self.select);
        let mut progressed = false;
        if !self.output.is_full() {
            if let Some(beat) = self.inputs[active].pop() {
                let last = beat.last;
                self.output.push(beat);
                if last && self.draining.is_some() {
                    self.draining = None;
                }
                progressed = true;
            }
        }
        if !progressed && self.sink {
            for (i, s) in self.inputs.iter().enumerate() {
                if i != active && s.pop().is_some() {
                    progressed = true;
                    break;
                }
            }
        }
        if progressed {
            BlockRet::Ok
        } else if self.inputs.iter().all(|s| s.eof()) {
            BlockRet::EOF
        } else {
            BlockRet::Noop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Beat;
    use crate::stream::new_stream;

    #[test]
    fn routes_the_selected_input() {
        let (w0, r0) = new_stream::<u32>(4);
        let (w1, r1) = new_stream::<u32>(4);
        w0.push(Beat::single(1));
        w1.push(Beat::single(2));
        let mut s = Select::new(vec![r0, r1], false, false);
        let out = s.out();
        s.work();
        assert_eq!(out.pop().unwrap().payload, 1);
        s.set_select(1);
        s.work();
        assert_eq!(out.pop().unwrap().payload, 2);
    }
}
