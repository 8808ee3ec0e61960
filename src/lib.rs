#![warn(missing_docs)]
/*! A synchronous dataflow streaming fabric.

This crate provides a handshake-based `Stream` abstraction — a uniform
valid/ready/first/last protocol — and a family of generic combinators
(routing, flow control, arbitration, buffering, width conversion,
packet arithmetic) that compose over it. Combinators are connected
into a `Graph`, which steps them cycle by cycle the way a synchronous
hardware simulator would, and can be driven and inspected with the
[`sim`] harness (`SourceSim`, `SinkSim`, `MonitorSim`).

# Architecture overview

An application is a set of `Block`s connected by `Stream`s. Each block
owns its input `ReadStream`s and output `WriteStream`s and implements
[`block::Block::work`], which is called once per simulated clock edge:
it looks at what's available on its inputs and what room is available
on its outputs, and moves at most the data one tick's worth of
hardware would move.

A typical graph:

```text
  [ ConstSource ]
        |
    [ Packetiser ]
        |
     [ Router ]
      /  |  \
   o[1] o[2]  e
```

# Example

```
use streamfab::graph::Graph;
use streamfab::layout::Layout;
use streamfab::blocks::{ConstSource, Sink};
use std::sync::Arc;

let layout = Arc::new(Layout::new(vec![("data", 8)]).unwrap());
let src = ConstSource::new(layout, vec![("data", 42)], Some(3)).unwrap();
let sink = Sink::new(src.out());
let mut g = Graph::new();
g.add(Box::new(src));
g.add(Box::new(sink));
g.run();
```
*/

pub mod arbiter;
pub mod bit_state;
pub mod block;
pub mod blocks;
pub mod circular_buffer;
pub mod collator;
pub mod connect;
pub mod const_source;
pub mod copy;
pub mod event;
pub mod gate;
pub mod gate_packet;
pub mod graph;
pub mod head;
pub mod join;
pub mod layout;
pub mod mtgraph;
pub mod mux_down;
pub mod mux_up;
pub mod op;
pub mod packet_split;
pub mod packetiser;
pub mod ram;
pub mod router;
pub mod select;
pub mod sequencer;
pub mod sim;
pub mod sink;
pub mod split;
pub mod stream;
pub mod stream_init;
pub mod stream_null;
pub mod stream_sync;
pub mod tee;
pub mod unary_op;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at construction time or as documented precondition
/// failures (see SPEC_FULL.md §7). There are no errors on the data path:
/// once a graph is built, `work()` never fails.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Two fields in a layout share a name.
    #[error("duplicate field name in layout: {0}")]
    DuplicateField(String),

    /// A field was given zero width.
    #[error("field {0} has zero width")]
    ZeroWidthField(String),

    /// A layout's concatenated payload width exceeds the 128-bit ceiling.
    #[error("layout payload width {0} bits exceeds the 128-bit ceiling")]
    LayoutTooWide(u32),

    /// A field was referenced that isn't present in the layout.
    #[error("field {0} not found in layout")]
    UnknownField(String),

    /// `connect()` was given a transform for a field it wouldn't emit.
    #[error("connect: transform given for field {0}, which is excluded or absent")]
    UnconsumedTransform(String),

    /// Two joined layouts share a field name.
    #[error("join: input layouts overlap on field {0}")]
    OverlappingLayout(String),

    /// `MuxDown`/`MuxUp` was constructed with inconsistent widths.
    #[error("width mismatch: {0}")]
    WidthMismatch(String),

    /// `Decimate` was constructed with `n <= 1`.
    #[error("decimate factor must be > 1, got {0}")]
    BadDecimateFactor(u64),

    /// `BitState` was constructed over a zero-width field.
    #[error("bit_state: field {0} has zero width")]
    ZeroSizedEnumeration(String),

    /// A value didn't fit in the declared field width.
    #[error("value {0} does not fit in a {1}-bit field")]
    ValueOverflow(u128, u32),
}

#[cfg(test)]
mod tests {
    //! Test helper functions shared across component test suites.

    /// Assert two packet traces (vectors of per-field value vectors) are equal.
    pub fn assert_packets_eq<T: std::fmt::Debug + PartialEq>(left: &[Vec<T>], right: &[Vec<T>]) {
        assert_eq!(left, right);
    }
}
