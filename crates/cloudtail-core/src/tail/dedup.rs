//! Dedup — bounded window of already-emitted event ids.
//!
//! Interleaved searches can serve an event on two consecutive pages, and
//! watch mode re-runs the whole search after every poll. The window
//! remembers the ids it admitted, oldest first, and rejects repeats. Ids
//! that fall off the back of the window are forgotten and would be
//! admitted again.

use std::collections::{HashSet, VecDeque};

pub struct DedupWindow {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Admit an id. `true` means first sighting inside the window and the
    /// caller should emit the event; `false` means a repeat to drop.
    pub fn admit(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(id.to_string());
        self.order.push_back(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
