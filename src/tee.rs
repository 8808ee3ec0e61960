//! `Tee`: broadcasts each input transfer to `n` outputs.
use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::Beat;
use crate::stream::{ReadStream, WriteStream};

/// Broadcasts every beat of `input` to `n` outputs.
///
/// If `wait_all` is set, the next input beat is only accepted once every
/// output has consumed the current one. Otherwise the next beat is
/// accepted as soon as any output has freed a slot (a conservative union
/// of readiness, matching the original's simplified backpressure policy).
pub struct Tee<T> {
    input: ReadStream<T>,
    outputs: Vec<WriteStream<T>>,
    out_rs: Vec<ReadStream<T>>,
    wait_all: bool,
    pending: Option<Beat<T>>,
    delivered: Vec<bool>,
}

impl<T: Clone> Tee<T> {
    /// Create a new `Tee` with `n` outputs.
    pub fn new(input: ReadStream<T>, n: usize, wait_all: bool) -> Self {
        let mut outputs = Vec::with_capacity(n);
        let mut out_rs = Vec::with_capacity(n);
        for _ in 0..n {
            let (w, r) = WriteStream::new();
            outputs.push(w);
            out_rs.push(r);
        }
        Self {
            input,
            outputs,
            out_rs,
            wait_all,
            pending: None,
            delivered: vec![false; n],
        }
    }

    /// This block's output streams, in order.
    #[must_use]
    pub fn outs(&self) -> Vec<ReadStream<T>> {
        self.out_rs.clone()
    }

    /// A single output stream by index.
    #[must_use]
    pub fn out(&self, idx: usize) -> ReadStream<T> {
        self.out_rs[idx].clone()
    }
}

impl<T> BlockName for Tee<T> {
    fn block_name(&self) -> &str {
        "Tee"
    }
}

impl<T> BlockEOF for Tee<T> {
    fn eof(&mut self) -> bool {
        self.pending.is_none() && self.input.eof()
    }
}

impl<T: Clone + Send> Block for Tee<T> {
    fn work(&mut self) -> BlockRet {
        if self.pending.is_none() {
            return match self.input.pop() {
                Some(beat) => {
                    self.pending = Some(beat);
                    self.delivered.iter_mut().for_each(|d| *d = false);
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
        let beat = self.pending.as_ref().unwrap().clone();
        let mut delivered_this_call = false;
        for (i, out) in self.outputs.iter().enumerate() {
            if !self.delivered[i] && !out.is_full() {
                out.push(beat.clone());
                self.delivered[i] = true;
                delivered_this_call = true;
            }
        }
        let all_delivered = self.delivered.iter().all(|&d| d);
        let any_delivered = self.delivered.iter().any(|&d| d);
        let done = if self.wait_all { all_delivered } else { any_delivered };
        if done {
            self.pending = None;
        }
        if delivered_this_call {
            BlockRet::Ok
        } else {
            BlockRet::Noop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::new_stream;

    #[test]
    fn broadcasts_to_every_output() {
        let (w, r) = new_stream::<u32>(4);
        w.push(Beat::single(7));
        drop(w);
        let mut t = Tee::new(r, 3, true);
        let outs = t.outs();
        while t.work() != BlockRet::EOF {}
        for o in &outs {
            assert_eq!(o.pop().unwrap().payload, 7);
        }
    }
}
