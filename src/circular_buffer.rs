//! The buffer backing a [`crate::stream::Stream`].
//!
//! The teacher implementation backing this module used an unsafe
//! double-`mmap`ed ring buffer to give `Copy` sample types zero-copy,
//! wraparound-free slices (see DESIGN.md for why that doesn't carry over
//! here). This domain's payload type is a small, non-`Copy` [`crate::layout::Record`]
//! or scalar processed one beat per simulated clock edge rather than in
//! bulk, so a plain mutex-guarded queue is the right tool: it is safe, and
//! at this granularity the extra allocation is immaterial.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

/// A FIFO queue of `T`, shared between one [`crate::stream::WriteStream`]
/// and one [`crate::stream::ReadStream`].
pub struct Buffer<T> {
    id: usize,
    capacity: usize,
    queue: Mutex<VecDeque<T>>,
    cv: Condvar,
}

/// Default queue capacity. A stream backpressures (its writer sees no room)
/// once this many beats are buffered and unread.
pub const DEFAULT_CAPACITY: usize = 1024;

impl<T> Buffer<T> {
    /// Create a new buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            capacity,
            queue: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
        }
    }

    /// Unique id, shared between the read and write side of one stream.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Room remaining before the writer would have to block.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Push one item. Panics if called beyond capacity: callers must check
    /// `remaining()` first, exactly as hardware must check `ready` before
    /// asserting `valid`.
    pub fn push(&self, item: T) {
        let mut q = self.queue.lock().unwrap();
        assert!(q.len() < self.capacity, "push on a full buffer");
        q.push_back(item);
        self.cv.notify_all();
    }

    /// Pop the front item, if any.
    pub fn pop(&self) -> Option<T> {
        let mut q = self.queue.lock().unwrap();
        let item = q.pop_front();
        if item.is_some() {
            self.cv.notify_all();
        }
        item
    }

    /// Block (with a timeout) until at least `need` items are queued, or the
    /// predicate `closed` becomes true. Returns the number actually queued
    /// when it wakes.
    #[must_use]
    pub fn wait_for(
        &self,
        need: usize,
        closed: impl Fn() -> bool,
        timeout: std::time::Duration,
    ) -> usize {
        let mut q = self.queue.lock().unwrap();
        while q.len() < need && !closed() {
            let (guard, _res) = self.cv.wait_timeout(q, timeout).unwrap();
            q = guard;
            if q.len() < need && !closed() {
                break;
            }
        }
        q.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_fifo() {
        let b: Buffer<u32> = Buffer::new(4);
        b.push(1);
        b.push(2);
        assert_eq!(b.len(), 2);
        assert_eq!(b.pop(), Some(1));
        assert_eq!(b.pop(), Some(2));
        assert_eq!(b.pop(), None);
    }

    #[test]
    fn remaining_tracks_capacity() {
        let b: Buffer<u32> = Buffer::new(2);
        assert_eq!(b.remaining(), 2);
        b.push(1);
        assert_eq!(b.remaining(), 1);
        b.push(2);
        assert_eq!(b.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "push on a full buffer")]
    fn push_beyond_capacity_panics() {
        let b: Buffer<u32> = Buffer::new(1);
        b.push(1);
        b.push(2);
    }
}
