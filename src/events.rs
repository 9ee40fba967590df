use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use crate::state::ServerRef;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Request {
    pub arrival_time: f64,
    pub category: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Arrival,
    EndRouting,
    EndService { server: ServerRef, request: Request },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Arrival,
    EndRouting,
    EndService,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Arrival => EventKind::Arrival,
            Event::EndRouting => EventKind::EndRouting,
            Event::EndService { .. } => EventKind::EndService,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Arrival => "arrival",
            EventKind::EndRouting => "end-routing",
            EventKind::EndService => "end-service",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug)]
pub struct ScheduledEvent {
    pub time: f64,
    pub seq: u64,
    pub event: Event,
}

// Equal timestamps pop in insertion order.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

/// Time-ordered queue of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, time: f64, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledEvent { time, seq, event }));
    }

    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop().map(|Reverse(scheduled)| scheduled)
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule_at(3.0, Event::Arrival);
        queue.schedule_at(1.0, Event::EndRouting);
        queue.schedule_at(2.0, Event::Arrival);

        let times: Vec<f64> = std::iter::from_fn(|| queue.pop_earliest())
            .map(|scheduled| scheduled.time)
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn equal_times_pop_in_insertion_order() {
        let mut queue = EventQueue::new();
        queue.schedule_at(5.0, Event::EndRouting);
        queue.schedule_at(5.0, Event::Arrival);
        queue.schedule_at(
            5.0,
            Event::EndService {
                server: ServerRef { group: 0, slot: 1 },
                request: Request {
                    arrival_time: 0.0,
                    category: 0,
                },
            },
        );

        let kinds: Vec<EventKind> = std::iter::from_fn(|| queue.pop_earliest())
            .map(|scheduled| scheduled.event.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![EventKind::EndRouting, EventKind::Arrival, EventKind::EndService]
        );
    }

    #[test]
    fn empty_queue_returns_none() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());
        assert!(queue.peek_time().is_none());
        assert!(queue.pop_earliest().is_none());
    }

    #[test]
    fn popped_times_never_decrease() {
        let mut queue = EventQueue::new();
        for idx in 0..64u32 {
            let time = f64::from((idx * 37) % 17) * 0.5;
            queue.schedule_at(time, Event::Arrival);
        }
        assert_eq!(queue.len(), 64);

        let mut last = f64::NEG_INFINITY;
        while let Some(scheduled) = queue.pop_earliest() {
            assert!(scheduled.time >= last);
            last = scheduled.time;
        }
    }
}
