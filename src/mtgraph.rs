/*! Multithreaded version of `Graph`, otherwise the same idea as `graph.rs`.

One OS thread per block, each spinning its own `work()` loop. Done
detection is two-phase: a block that sees `Noop` marks itself
"awaiting" and parks briefly; if every block in the graph is
simultaneously `Noop`/`EOF`/awaiting, the graph as a whole is done and
every thread is told to stop via a shared cancellation flag.
*/
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crate::block::{Block, BlockRet};

/// Per-block timing, returned by [`MTGraph::run`].
#[derive(Debug, Clone)]
pub struct BlockStats {
    /// The block's type name.
    pub name: String,
    /// Total time spent inside `work()`.
    pub busy: Duration,
    /// Number of `work()` calls made.
    pub calls: u64,
}

/// Multithreaded graph runner: one thread per block.
#[derive(Default)]
pub struct MTGraph {
    blocks: Vec<Box<dyn Block + Send>>,
}

const POLL_IDLE: Duration = Duration::from_micros(100);

impl MTGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Add a block to the graph.
    pub fn add(&mut self, block: Box<dyn Block + Send>) {
        self.blocks.push(block);
    }

    /// Run every block on its own thread until the whole graph is idle.
    ///
    /// Returns per-block timing stats, in the order blocks were added.
    pub fn run(self) -> Vec<BlockStats> {
        let n = self.blocks.len();
        if n == 0 {
            return Vec::new();
        }
        let awaiting = Arc::new(AtomicUsize::new(0));
        let cancel = Arc::new(AtomicBool::new(false));
        let barrier = Arc::new(Barrier::new(n));

        let handles: Vec<_> = self
            .blocks
            .into_iter()
            .enumerate()
            .map(|(idx, mut block)| {
                let awaiting = awaiting.clone();
                let cancel = cancel.clone();
                let barrier = barrier.clone();
                thread::Builder::new()
                    .name(format!("block-{idx}"))
                    .spawn(move || {
                        let name = block.block_name().to_string();
                        let mut busy = Duration::ZERO;
                        let mut calls = 0u64;
                        let mut parked = false;
                        loop {
                            if cancel.load(Ordering::Acquire) {
                                break;
                            }
                            let start = Instant::now();
                            let ret = block.work();
                            busy += start.elapsed();
                            calls += 1;
                            match ret {
                                BlockRet::Ok | BlockRet::Pending => {
                                    if parked {
                                        awaiting.fetch_sub(1, Ordering::AcqRel);
                                        parked = false;
                                    }
                                }
                                BlockRet::Noop | BlockRet::EOF => {
                                    if !parked {
                                        awaiting.fetch_add(1, Ordering::AcqRel);
                                        parked = true;
                                    }
                                    if awaiting.load(Ordering::Acquire) == n {
                                        cancel.store(true, Ordering::Release);
                                        break;
                                    }
                                    thread::sleep(POLL_IDLE);
                                }
                                BlockRet::InternalAwaiting => {
                                    unreachable!("work() must never return InternalAwaiting")
                                }
                            }
                        }
                        barrier.wait();
                        BlockStats { name, busy, calls }
                    })
                    .expect("failed to spawn block thread")
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("block thread panicked"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{ConstSource, Sink};
    use crate::layout::Layout;
    use std::sync::Arc as StdArc;

    #[test]
    fn runs_blocks_concurrently_to_completion() {
        let layout = StdArc::new(Layout::data(8).unwrap());
        let src = ConstSource::new(layout, vec![("data", 1)], Some(50)).unwrap();
        let sink = Sink::new(src.out());
        let mut g = MTGraph::new();
        g.add(Box::new(src));
        g.add(Box::new(sink));
        let stats = g.run();
        assert_eq!(stats.len(), 2);
    }
}
