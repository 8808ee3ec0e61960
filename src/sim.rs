/*! Deterministic simulation harness: `SourceSim`, `SinkSim`, `MonitorSim`.

These drive a graph cycle by cycle outside of [`crate::graph::Graph`]'s own
scheduling loop, for use in component tests: a `SourceSim` feeds a
[`crate::stream::WriteStream`] on a schedule, a `SinkSim` drains a
[`crate::stream::ReadStream`] and records completed packets, and a
`MonitorSim` taps a stream read-only, recording transfers without ever
driving its `ready` signal.
*/
use std::collections::VecDeque;
use std::sync::Arc;

pub use crate::layout::to_packet;
use crate::layout::{Beat, Layout, Record};
use crate::stream::{ReadStream, WriteStream};
use crate::Result;

struct Scheduled {
    delay: u64,
    record: Record,
    first: bool,
    last: bool,
}

/// Feeds a [`WriteStream<Record>`] on a schedule: each queued item waits
/// `delay_ticks` calls to [`SourceSim::poll`] before it is pushed (subject
/// to the usual backpressure — a push that finds the stream full is
/// retried on a later `poll`).
pub struct SourceSim {
    output: WriteStream<Record>,
    layout: Arc<Layout>,
    queue: VecDeque<Scheduled>,
    verbose: bool,
}

impl SourceSim {
    /// Create a new `SourceSim` feeding `output`, whose records conform to
    /// `layout`.
    #[must_use]
    pub fn new(output: WriteStream<Record>, layout: Arc<Layout>, verbose: bool) -> Self {
        Self {
            output,
            layout,
            queue: VecDeque::new(),
            verbose,
        }
    }

    /// Enqueue one beat, held for `delay_ticks` calls to `poll` before
    /// being offered to the stream.
    pub fn push(&mut self, delay_ticks: u64, fields: &[(&str, u64)], first: bool, last: bool) -> Result<()> {
        let mut rec = Record::zero(self.layout.clone());
        for (name, value) in fields {
            rec.set(name, *value)?;
        }
        self.queue.push_back(Scheduled {
            delay: delay_ticks,
            record: rec,
            first,
            last,
        });
        Ok(())
    }

    /// Enqueue a whole pre-framed packet (see [`to_packet`]), each beat
    /// delayed `delay_ticks` behind the previous.
    pub fn push_packet(&mut self, delay_ticks: u64, field: &str, values: &[u64]) -> Result<()> {
        for beat in to_packet(values) {
            self.push(delay_ticks, &[(field, beat.payload)], beat.first, beat.last)?;
        }
        Ok(())
    }

    /// Discard everything queued, returning to the empty state.
    pub fn reset(&mut self) {
        self.queue.clear();
    }

    /// Advance one simulated tick: decrement every queued item's delay,
    /// and push the front item if its delay has elapsed and there's room.
    pub fn poll(&mut self) -> bool {
        let Some(front) = self.queue.front_mut() else {
            return false;
        };
        if front.delay > 0 {
            front.delay -= 1;
            return false;
        }
        if self.output.is_full() {
            return false;
        }
        let item = self.queue.pop_front().unwrap();
        if self.verbose {
            log::trace!("SourceSim: pushing beat (first={}, last={})", item.first, item.last);
        }
        self.output.push(Beat {
            payload: item.record,
            first: item.first,
            last: item.last,
        });
        true
    }

    /// True once every queued item has been accepted by the stream.
    #[must_use]
    pub fn done(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Drains a [`ReadStream<Record>`], grouping beats into completed packets
/// (a run from `first` to `last`) for later inspection with
/// [`SinkSim::get_data`].
pub struct SinkSim {
    input: ReadStream<Record>,
    packets: Vec<Vec<Record>>,
    current: Vec<Record>,
    read_data: bool,
}

impl SinkSim {
    /// Create a new `SinkSim` draining `input`. If `read_data` is false,
    /// beats are consumed but not retained (useful when only completion,
    /// not content, matters).
    #[must_use]
    pub fn new(input: ReadStream<Record>, read_data: bool) -> Self {
        Self {
            input,
            packets: Vec::new(),
            current: Vec::new(),
            read_data,
        }
    }

    /// Drain one beat if available, closing out a packet on `last`.
    /// Returns true if a beat was consumed.
    pub fn poll(&mut self) -> bool {
        match self.input.pop() {
            Some(beat) => {
                if self.read_data {
                    self.current.push(beat.payload);
                }
                if beat.last {
                    self.packets.push(std::mem::take(&mut self.current));
                }
                true
            }
            None => false,
        }
    }

    /// All completed packets so far, each as its per-beat records.
    #[must_use]
    pub fn packets(&self) -> &[Vec<Record>] {
        &self.packets
    }

    /// Completed packets, with each beat reduced to the value of one
    /// named field.
    #[must_use]
    pub fn get_data(&self, field: &str) -> Vec<Vec<u64>> {
        self.packets
            .iter()
            .map(|p| p.iter().map(|r| r.get(field).unwrap_or(0)).collect())
            .collect()
    }

    /// Clear all recorded packets and any in-progress partial packet.
    pub fn reset(&mut self) {
        self.packets.clear();
        self.current.clear();
    }
}

/// A passive tap on a stream: records transfers without ever consuming
/// them, so it can observe a stream whose real consumer is elsewhere in
/// the graph.
pub struct MonitorSim {
    input: ReadStream<Record>,
    seen: Vec<Beat<Record>>,
    last: Option<Beat<Record>>,
}

impl MonitorSim {
    /// Create a new `MonitorSim` tapping `input`.
    #[must_use]
    pub fn new(input: ReadStream<Record>) -> Self {
        Self {
            input,
            seen: Vec::new(),
            last: None,
        }
    }

    /// Peek at the stream's current head, recording it if it's a new
    /// transfer (distinct from the one most recently recorded). Never
    /// pops: the stream's real consumer is unaffected.
    pub fn poll(&mut self) -> bool {
        let Some(beat) = self.input.peek() else {
            return false;
        };
        if self.last.as_ref() == Some(&beat) {
            return false;
        }
        self.last = Some(beat.clone());
        self.seen.push(beat);
        true
    }

    /// All transfers recorded so far.
    #[must_use]
    pub fn seen(&self) -> &[Beat<Record>] {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::new_stream;

    #[test]
    fn source_sim_respects_delay_before_pushing() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = new_stream::<Record>(4);
        let mut src = SourceSim::new(w, layout, false);
        src.push(2, &[("data", 7)], true, true).unwrap();
        assert!(!src.poll());
        assert!(!src.poll());
        assert!(src.poll());
        assert!(src.done());
        assert_eq!(r.pop().unwrap().payload.get("data").unwrap(), 7);
    }

    #[test]
    fn sink_sim_groups_beats_into_packets() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = new_stream::<Record>(8);
        for b in to_packet(&[1u64, 2, 3]) {
            let mut rec = Record::zero(layout.clone());
            rec.set("data", b.payload).unwrap();
            w.push(Beat {
                payload: rec,
                first: b.first,
                last: b.last,
            });
        }
        drop(w);
        let mut sink = SinkSim::new(r, true);
        while sink.poll() {}
        assert_eq!(sink.get_data("data"), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn monitor_sim_does_not_consume() {
        let layout = Arc::new(Layout::data(8).unwrap());
        let (w, r) = new_stream::<Record>(4);
        let mut rec = Record::zero(layout);
        rec.set("data", 9).unwrap();
        w.push(Beat::single(rec));
        let mut mon = MonitorSim::new(r.clone());
        assert!(mon.poll());
        assert_eq!(mon.seen().len(), 1);
        // The beat is still there for the real consumer.
        assert_eq!(r.pop().unwrap().payload.get("data").unwrap(), 9);
    }
}
