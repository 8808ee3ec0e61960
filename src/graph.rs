/*! Graphs contain blocks connected by streams, and run them.

This is the single-threaded realization of SPEC_FULL.md §5's option (a):
a cycle-stepped evaluator that repeatedly calls every block's `work()`
until the graph reaches a fixed point (every block reports `Noop`/`EOF`
with no progress for two consecutive rounds), or every block has
reported `EOF`.
*/
use crate::block::{Block, BlockRet};

/// Single-threaded graph runner.
pub struct Graph {
    blocks: Vec<Box<dyn Block>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Add a block to the graph.
    pub fn add(&mut self, block: Box<dyn Block>) {
        self.blocks.push(block);
    }

    /// Number of blocks in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True if the graph has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Run every block to completion.
    ///
    /// Each round calls `work()` once on every block. The graph is done
    /// once a round makes no progress (no block returned `Ok`/`Pending`)
    /// for two consecutive rounds — mirroring the two-phase done-detection
    /// used by [`crate::mtgraph::MTGraph`].
    pub fn run(&mut self) {
        let mut idle_rounds = 0;
        loop {
            let mut progressed = false;
            let mut all_eof = true;
            for block in &mut self.blocks {
                match block.work() {
                    BlockRet::Ok | BlockRet::Pending => progressed = true,
                    BlockRet::Noop => all_eof = false,
                    BlockRet::EOF => {}
                    BlockRet::InternalAwaiting => {
                        unreachable!("work() must never return InternalAwaiting")
                    }
                }
            }
            if all_eof {
                log::debug!("graph: all blocks report EOF, done");
                return;
            }
            if progressed {
                idle_rounds = 0;
            } else {
                idle_rounds += 1;
                if idle_rounds >= 2 {
                    log::debug!("graph: reached fixed point with no progress, done");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{ConstSource, Sink};
    use crate::layout::Layout;
    use std::sync::Arc;

    #[test]
    fn runs_a_trivial_source_to_sink_graph() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let src = ConstSource::new(layout, vec![("data", 42)], Some(3)).unwrap();
        let sink = Sink::new(src.out());
        let mut g = Graph::new();
        g.add(Box::new(src));
        g.add(Box::new(sink));
        g.run();
    }
}
