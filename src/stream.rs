/*! Streams connecting blocks.

Blocks are connected with streams. A block can have zero or more input
streams, and write to zero or more output streams.

Each `Stream<T>` is the valid/ready/first/last handshake of SPEC_FULL.md
§3, with `T` the payload type (usually a [`crate::layout::Record`], or a
bare scalar for the width adapters and arithmetic blocks). The element
actually queued is a [`crate::layout::Beat<T>`]: payload plus framing.
*/
use std::sync::Arc;

use crate::circular_buffer::{Buffer, DEFAULT_CAPACITY};
use crate::layout::Beat;

/// Wait on a stream's readiness.
///
/// For `ReadStream`, wait until there's something to read.
/// For `WriteStream`, wait until there's room to write.
pub trait StreamWait {
    /// ID shared between the read and write side of one stream.
    #[must_use]
    fn id(&self) -> usize;

    /// True if the other end of this stream has gone away and will never
    /// produce/accept anything more.
    #[must_use]
    fn closed(&self) -> bool;
}

/// The reading side of a stream.
#[derive(Debug)]
pub struct ReadStream<T> {
    buf: Arc<Buffer<Beat<T>>>,
}

impl<T> Clone for ReadStream<T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
        }
    }
}

impl<T> ReadStream<T> {
    /// Pop the next queued beat, if any.
    pub fn pop(&self) -> Option<Beat<T>> {
        self.buf.pop()
    }

    /// Number of beats currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing is queued right now.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True if the writer has disconnected and the queue has drained: no
    /// more data will ever arrive.
    #[must_use]
    pub fn eof(&self) -> bool {
        Arc::strong_count(&self.buf) == 1 && self.buf.is_empty()
    }
}

impl<T: Clone> ReadStream<T> {
    /// Peek at the next queued beat without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<Beat<T>> {
        // There is no peek on the underlying queue; pop-then-repush keeps
        // FIFO order intact since this stream has exactly one reader.
        let item = self.buf.pop()?;
        self.buf.push(item.clone());
        Some(item)
    }

    /// Construct a stream pre-loaded with the given beats, with no writer
    /// left attached: once drained, `eof()` is true. For tests.
    #[cfg(test)]
    #[must_use]
    pub fn from_beats(beats: Vec<Beat<T>>) -> Self {
        let (w, r) = new_stream(DEFAULT_CAPACITY.max(beats.len() + 1));
        for b in beats {
            w.push(b);
        }
        r
    }
}

impl<T> StreamWait for ReadStream<T> {
    fn id(&self) -> usize {
        self.buf.id()
    }
    fn closed(&self) -> bool {
        self.eof()
    }
}

/// The writing side of a stream.
#[derive(Debug)]
pub struct WriteStream<T> {
    buf: Arc<Buffer<Beat<T>>>,
}

impl<T> Clone for WriteStream<T> {
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
        }
    }
}

impl<T> WriteStream<T> {
    /// Create a new stream pair with the default capacity.
    #[must_use]
    pub fn new() -> (WriteStream<T>, ReadStream<T>) {
        new_stream(DEFAULT_CAPACITY)
    }

    /// Room left before a push would have to block.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// True if there's no room to push right now.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Push one beat. Callers must check `remaining() > 0` first.
    pub fn push(&self, beat: Beat<T>) {
        self.buf.push(beat);
    }
}

impl<T> StreamWait for WriteStream<T> {
    fn id(&self) -> usize {
        self.buf.id()
    }
    fn closed(&self) -> bool {
        Arc::strong_count(&self.buf) == 1
    }
}

/// Construct a new stream pair sharing one buffer of the given capacity.
#[must_use]
pub fn new_stream<T>(capacity: usize) -> (WriteStream<T>, ReadStream<T>) {
    let buf = Arc::new(Buffer::new(capacity));
    (
        WriteStream { buf: buf.clone() },
        ReadStream { buf },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_round_trips() {
        let (w, r) = new_stream::<u32>(8);
        w.push(Beat::single(7));
        let b = r.pop().unwrap();
        assert_eq!(b.payload, 7);
        assert!(b.first && b.last);
    }

    #[test]
    fn eof_true_only_after_writer_dropped_and_drained() {
        let (w, r) = new_stream::<u32>(8);
        w.push(Beat::single(1));
        assert!(!r.eof());
        drop(w);
        assert!(!r.eof(), "still has a queued beat");
        r.pop();
        assert!(r.eof());
    }

    #[test]
    fn remaining_reflects_capacity() {
        let (w, _r) = new_stream::<u32>(1);
        assert_eq!(w.remaining(), 1);
        w.push(Beat::single(1));
        assert_eq!(w.remaining(), 0);
    }
}
