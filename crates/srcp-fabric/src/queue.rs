use std::collections::VecDeque;

use crate::event::{Event, Priority};

/// A 4-bucket priority queue: one FIFO per priority level. Simpler than a
/// binary heap given the small, closed priority set, and its ordering is
/// equivalent to a stable heap keyed on `(priority, enqueue_seq)` as long
/// as every bucket stays FIFO, which a `VecDeque` guarantees for free.
#[derive(Default)]
pub struct PriorityQueue {
    critical: VecDeque<Event>,
    high: VecDeque<Event>,
    normal: VecDeque<Event>,
    low: VecDeque<Event>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.bucket_mut(event.priority).push_back(event);
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.critical
            .pop_front()
            .or_else(|| self.high.pop_front())
            .or_else(|| self.normal.pop_front())
            .or_else(|| self.low.pop_front())
    }

    pub fn is_empty(&self) -> bool {
        self.critical.is_empty() && self.high.is_empty() && self.normal.is_empty() && self.low.is_empty()
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.high.len() + self.normal.len() + self.low.len()
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut VecDeque<Event> {
        match priority {
            Priority::Critical => &mut self.critical,
            Priority::High => &mut self.high,
            Priority::Normal => &mut self.normal,
            Priority::Low => &mut self.low,
        }
    }
}
