//! Events and the two interchangeable agenda layouts.
//!
//! # Ordering
//!
//! Events are ordered by `(time, kind, seq)`:
//!
//! 1. earlier `time` first (`f64::total_cmp`, so ordering is total);
//! 2. at equal times, the **arrival is processed before any departure**;
//! 3. departures at equal times run in the order they were scheduled.
//!
//! Rule 2 is the engine's tie-break policy.  Both agenda forms apply it, so
//! a run is identical whichever one the driver uses.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use qn_core::{CenterId, SimTime};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Arrival,
    /// Departure from `center`, valid only while its generation still equals
    /// `generation`.
    Departure { center: CenterId, generation: u64 },
}

impl EventKind {
    #[inline]
    fn rank(&self) -> u8 {
        match self {
            EventKind::Arrival => 0,
            EventKind::Departure { .. } => 1,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
    seq:      u64,
}

impl Event {
    pub fn new(time: SimTime, kind: EventKind, seq: u64) -> Self {
        Self { time, kind, seq }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Event {}
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

// ── Agenda ────────────────────────────────────────────────────────────────────

/// Pending-event store.  At most one arrival is pending at any time.
pub trait Agenda: Default {
    fn schedule_arrival(&mut self, time: SimTime);
    fn schedule_departure(&mut self, time: SimTime, center: CenterId, generation: u64);

    /// Time of the next event without removing it.
    fn peek_time(&self) -> Option<SimTime>;
    fn pop(&mut self) -> Option<Event>;

    fn has_arrival(&self) -> bool;
    /// Pending events, stale departures included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every event in one binary min-heap.
#[derive(Debug, Default)]
pub struct UnifiedAgenda {
    heap:     BinaryHeap<Reverse<Event>>,
    seq:      u64,
    arrivals: usize,
}

impl UnifiedAgenda {
    fn push(&mut self, time: SimTime, kind: EventKind) {
        self.heap.push(Reverse(Event::new(time, kind, self.seq)));
        self.seq += 1;
    }
}

impl Agenda for UnifiedAgenda {
    fn schedule_arrival(&mut self, time: SimTime) {
        debug_assert_eq!(self.arrivals, 0, "second pending arrival");
        self.arrivals += 1;
        self.push(time, EventKind::Arrival);
    }

    fn schedule_departure(&mut self, time: SimTime, center: CenterId, generation: u64) {
        self.push(time, EventKind::Departure { center, generation });
    }

    fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(e)| e.time)
    }

    fn pop(&mut self) -> Option<Event> {
        let Reverse(event) = self.heap.pop()?;
        if event.kind == EventKind::Arrival {
            self.arrivals -= 1;
        }
        Some(event)
    }

    fn has_arrival(&self) -> bool {
        self.arrivals > 0
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Next-arrival slot plus a departures-only heap.
#[derive(Debug, Default)]
pub struct SplitAgenda {
    /// Time of the single scheduled arrival.
    next_arrival: Option<SimTime>,
    departures:   BinaryHeap<Reverse<Event>>,
    seq:          u64,
}

impl Agenda for SplitAgenda {
    fn schedule_arrival(&mut self, time: SimTime) {
        debug_assert!(self.next_arrival.is_none(), "second pending arrival");
        self.next_arrival = Some(time);
    }

    fn schedule_departure(&mut self, time: SimTime, center: CenterId, generation: u64) {
        let kind = EventKind::Departure { center, generation };
        self.departures.push(Reverse(Event::new(time, kind, self.seq)));
        self.seq += 1;
    }

    fn peek_time(&self) -> Option<SimTime> {
        let dep = self.departures.peek().map(|Reverse(e)| e.time);
        match (self.next_arrival, dep) {
            (Some(a), Some(d)) => Some(if a.total_cmp(&d).is_le() { a } else { d }),
            (a, d) => a.or(d),
        }
    }

    fn pop(&mut self) -> Option<Event> {
        let dep = self.departures.peek().map(|Reverse(e)| e.time);
        let arrival_first = match (self.next_arrival, dep) {
            (Some(a), Some(d)) => a.total_cmp(&d).is_le(),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if arrival_first {
            let time = self.next_arrival.take()?;
            return Some(Event::new(time, EventKind::Arrival, 0));
        }
        self.departures.pop().map(|Reverse(e)| e)
    }

    fn has_arrival(&self) -> bool {
        self.next_arrival.is_some()
    }

    fn len(&self) -> usize {
        self.departures.len() + usize::from(self.next_arrival.is_some())
    }
}
