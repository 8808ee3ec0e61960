//! Shared RAM model and the two stream adapters that drive it.
use std::sync::{Arc, Mutex};

use crate::block::{Block, BlockEOF, BlockName, BlockRet};
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

/// A plain dual-port memory: one word of `width` bits per address, shared
/// (via `Arc`) between a [`StreamToRam`] writer and a [`RamToStream`]
/// reader. Both ports can be driven on the same simulated cycle; there is
/// no contention model beyond mutual exclusion of the backing store.
#[derive(Debug)]
pub struct DualPortMemory {
    width: u32,
    data: Mutex<Vec<u64>>,
}

impl DualPortMemory {
    /// Create a new memory of `depth` words, each `width` bits, initialized
    /// to zero.
    #[must_use]
    pub fn new(depth: usize, width: u32) -> Arc<Self> {
        Arc::new(Self {
            width,
            data: Mutex::new(vec![0; depth]),
        })
    }

    /// Read one word.
    #[must_use]
    pub fn read(&self, addr: usize) -> u64 {
        self.data.lock().unwrap()[addr]
    }

    /// Write one word, masked to the memory's width.
    pub fn write(&self, addr: usize, value: u64) {
        self.data.lock().unwrap()[addr] = value & crate::layout::mask(self.width);
    }

    /// Number of addressable words.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.data.lock().unwrap().len()
    }
}

/// Writes each input beat's `data` field into consecutive memory locations,
/// starting at `offset` and advancing by `incr` per beat. Input is drained
/// unconditionally: this block never asserts backpressure.
pub struct StreamToRam {
    input: ReadStream<Record>,
    mem: Arc<DualPortMemory>,
    addr: isize,
    offset: isize,
    incr: isize,
}

impl StreamToRam {
    /// Create a new `StreamToRam` writing into `mem` starting at `offset`,
    /// advancing by `incr` words per beat. `incr` may be negative or zero.
    #[must_use]
    pub fn new(input: ReadStream<Record>, mem: Arc<DualPortMemory>, offset: isize, incr: isize) -> Self {
        Self {
            input,
            mem,
            addr: offset,
            offset,
            incr,
        }
    }

    /// Reset the write pointer back to `offset`.
    pub fn reset(&mut self) {
        self.addr = self.offset;
    }
}

impl BlockName for StreamToRam {
    fn block_name(&self) -> &str {
        "StreamToRam"
    }
}
impl BlockEOF for StreamToRam {
    fn eof(&mut self) -> bool {
        self.input.eof()
    }
}
impl Block for StreamToRam {
    fn work(&mut self) -> BlockRet {
        match self.input.pop() {
            Some(beat) => {
                let value = beat.payload.get("data").expect("StreamToRam input must have a data field");
                let depth = self.mem.depth() as isize;
                self.mem.write(self.addr.rem_euclid(depth) as usize, value);
                self.addr += self.incr;
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

/// Reads `n` words out of `mem` starting at `offset`, advancing by `incr`
/// per beat, framing them as one packet. Idle until [`RamToStream::start`]
/// is called; re-arms automatically once the packet completes so repeated
/// `start()` calls replay the configured window.
pub struct RamToStream {
    mem: Arc<DualPortMemory>,
    output: WriteStream<Record>,
    out_r: ReadStream<Record>,
    layout: Arc<Layout>,
    offset: isize,
    incr: isize,
    n: usize,
    addr: isize,
    remaining: usize,
    armed: bool,
}

impl RamToStream {
    /// Create a new `RamToStream` reading `n` words from `mem` starting at
    /// `offset`, advancing by `incr` per beat. `incr` may be negative or
    /// zero, for descending or static read windows.
    #[must_use]
    pub fn new(mem: Arc<DualPortMemory>, layout: Arc<Layout>, offset: isize, incr: isize, n: usize) -> Self {
        let (output, out_r) = WriteStream::new();
        Self {
            mem,
            output,
            out_r,
            layout,
            offset,
            incr,
            n,
            addr: offset,
            remaining: 0,
            armed: false,
        }
    }

    /// This block's output stream.
    #[must_use]
    pub fn out(&self) -> ReadStream<Record> {
        self.out_r.clone()
    }

    /// Arm the block to emit one `n`-word packet starting at `offset`.
    pub fn start(&mut self) {
        self.addr = self.offset;
        self.remaining = self.n;
        self.armed = true;
    }

    /// Reset to the idle state, discarding any in-flight packet.
    pub fn reset(&mut self) {
        self.armed = false;
        self.remaining = 0;
    }
}

impl BlockName for RamToStream {
    fn block_name(&self) -> &str {
        "RamToStream"
    }
}
impl BlockEOF for RamToStream {
    fn eof(&mut self) -> bool {
        false
    }
}
impl Block for RamToStream {
    fn work(&mut self) -> BlockRet {
        if !self.armed || self.n == 0 {
            return BlockRet::Noop;
        }
        if self.output.is_full() {
            return BlockRet::Noop;
        }
        let is_first = self.remaining == self.n;
        let depth = self.mem.depth() as isize;
        let value = self.mem.read(self.addr.rem_euclid(depth) as usize);
        self.addr += self.incr;
        self.remaining -= 1;
        let is_last = self.remaining == 0;
        let mut rec = Record::zero(self.layout.clone());
        rec.set("data", value).unwrap();
        self.output.push(Beat {
            payload: rec,
            first: is_first,
            last: is_last,
        });
        if is_last {
            self.armed = false;
        }
        BlockRet::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_then_reads_back_through_shared_memory() {
        let mem = DualPortMemory::new(16, 8);
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = crate::stream::new_stream::<Record>(8);
        for v in [10u64, 20, 30] {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", v).unwrap();
            w.push(Beat::single(rec));
        }
        drop(w);
        let mut writer = StreamToRam::new(r, mem.clone(), 0, 1);
        while writer.work() != BlockRet::EOF {}

        let mut reader = RamToStream::new(mem, layout, 0, 1, 3);
        let out = reader.out();
        reader.start();
        for _ in 0..3 {
            reader.work();
        }
        let vals: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(vals, vec![10, 20, 30]);
    }

    #[test]
    fn negative_incr_reads_a_descending_window() {
        let mem = DualPortMemory::new(16, 8);
        let layout = Arc::new(Layout::data(8).unwrap());
        for (addr, v) in [10u64, 20, 30].into_iter().enumerate() {
            mem.write(addr, v);
        }
        let mut reader = RamToStream::new(mem, layout, 2, -1, 3);
        let out = reader.out();
        reader.start();
        for _ in 0..3 {
            reader.work();
        }
        let vals: Vec<u64> = std::iter::from_fn(|| out.pop()).map(|b| b.payload.get("data").unwrap()).collect();
        assert_eq!(vals, vec![30, 20, 10]);
    }
}
