//! Rejects inbound events that were already routed.

use crate::bounded::BoundedSet;
use crate::ids::EventId;

/// Default number of remembered event identifiers.
pub const DEFAULT_DEDUP_CAPACITY: usize = 10_000;

/// Remembers processed event identifiers.
///
/// The transport delivers at-least-once, so the same update may arrive twice.
/// Only the most recent `capacity` identifiers are remembered. Identifiers
/// increase monotonically, so anything at or below the highest evicted one is
/// treated as already routed.
#[derive(Debug)]
pub struct EventDeduplicator {
    seen: BoundedSet<EventId>,
    evicted_up_to: Option<EventId>,
}

impl EventDeduplicator {
    /// Creates a deduplicator remembering at most `capacity` identifiers.
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: BoundedSet::new(capacity),
            evicted_up_to: None,
        }
    }

    /// Records the identifier and returns whether the event should be routed.
    pub fn should_process(&mut self, id: EventId) -> bool {
        if self.evicted_up_to.is_some_and(|floor| id <= floor) {
            return false;
        }
        let (fresh, evicted) = self.seen.insert_evicting(id);
        if let Some(oldest) = evicted {
            self.evicted_up_to = Some(self.evicted_up_to.map_or(oldest, |floor| floor.max(oldest)));
        }
        fresh
    }

    /// Number of remembered identifiers.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}
