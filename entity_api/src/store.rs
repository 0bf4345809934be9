use dashmap::DashMap;
use entity::{dispatches, trips, Id};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory record store. Ids start at 1 and are never reused.
pub struct Store {
    pub(crate) trips: DashMap<Id, trips::Model>,
    pub(crate) dispatches: DashMap<Id, dispatches::Model>,
    next_trip_id: AtomicI64,
    next_dispatch_id: AtomicI64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            trips: DashMap::new(),
            dispatches: DashMap::new(),
            next_trip_id: AtomicI64::new(1),
            next_dispatch_id: AtomicI64::new(1),
        }
    }

    pub(crate) fn next_trip_id(&self) -> Id {
        self.next_trip_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn next_dispatch_id(&self) -> Id {
        self.next_dispatch_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
