/*! Block implementation.

Blocks are the building blocks of a graph. Each owns its own input
[`crate::stream::ReadStream`]s and output [`crate::stream::WriteStream`]s
and does one thing: it implements [`Block::work`], called once per
simulated clock edge by [`crate::graph::Graph`]/[`crate::mtgraph::MTGraph`].

A block's unit of work is one beat per port per call, matching the
one-clock-edge granularity of SPEC_FULL.md §4.10 — `work()` looks at
`valid`/`ready` (are inputs available, is there room downstream) and
moves at most what one hardware clock edge would move.
*/

/// Return type for [`Block::work`].
///
/// Lets the scheduler know whether to keep calling this block, and when
/// the whole graph is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRet {
    /// At least one transfer happened this call.
    ///
    /// More progress may be possible immediately; the scheduler should call
    /// `work()` again before moving on.
    Ok,

    /// No transfer happened, but the block has internal state that may
    /// still produce output without new input (e.g. a multi-beat width
    /// adapter mid-accumulation).
    Pending,

    /// No transfer happened, because there isn't enough input or room on
    /// an output.
    ///
    /// When every block in a graph reports either `Noop` or `EOF` for two
    /// consecutive rounds, the graph is done.
    Noop,

    /// This block will never produce any more output.
    ///
    /// Examples: a finite `ConstSource` that has emitted its configured
    /// count; a block whose sole input stream reports `eof()`.
    EOF,

    /// Internal state used by the two-phase done-detection in
    /// [`crate::mtgraph::MTGraph`]. A block's `work()` must never return
    /// this.
    InternalAwaiting,
}

/// Name of a block, for diagnostics.
pub trait BlockName {
    /// Name of the block type (not of a particular instance).
    fn block_name(&self) -> &str;
}

/// EOF status of a block.
pub trait BlockEOF {
    /// Return true if this block will never produce more output.
    fn eof(&mut self) -> bool {
        false
    }
}

/// Trait all blocks must implement.
pub trait Block: BlockName + BlockEOF {
    /// Do one clock edge's worth of work.
    fn work(&mut self) -> BlockRet;
}
