use crate::filter::Filter;
use events::TripEvent;
use log::*;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tokio_util::sync::CancellationToken;

/// Unique identifier for a subscription (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of offering one event to one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    Delivered,
    Filtered,
    /// Queue full; the event is lost for this subscriber only.
    Dropped,
    /// The session is draining and no longer takes events.
    Closed,
}

/// A registered observer: the sending half of its bounded queue plus its filter.
pub(crate) struct Subscription {
    id: SubscriptionId,
    filter: RwLock<Filter>,
    sender: Sender<TripEvent>,
    cancel: CancellationToken,
    dropped: AtomicU64,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        filter: Filter,
        sender: Sender<TripEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            filter: RwLock::new(filter),
            sender,
            cancel,
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub(crate) fn set_filter(&self, filter: Filter) {
        *self.filter.write() = filter;
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Non-blocking enqueue of `event` if the filter accepts it.
    pub(crate) fn offer(&self, event: &TripEvent) -> Offer {
        if !self.filter.read().accepts(event) {
            return Offer::Filtered;
        }

        match self.sender.try_send(event.clone()) {
            Ok(()) => Offer::Delivered,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "Subscription {} queue is full, dropped {} event for trip {} ({} dropped so far)",
                    self.id,
                    event.kind(),
                    event.entity_id(),
                    dropped
                );
                Offer::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Subscription {} is draining, skipping event", self.id);
                Offer::Closed
            }
        }
    }
}

/// The set of live subscriptions, guarded by a single lock.
///
/// The lock is only ever held for a map mutation or a snapshot copy, never
/// while touching a queue or a transport.
pub struct Registry {
    subscriptions: Mutex<HashMap<SubscriptionId, Arc<Subscription>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn insert(&self, subscription: Arc<Subscription>) {
        self.subscriptions
            .lock()
            .insert(subscription.id().clone(), subscription);
    }

    pub(crate) fn remove(&self, id: &SubscriptionId) -> Option<Arc<Subscription>> {
        self.subscriptions.lock().remove(id)
    }

    pub(crate) fn get(&self, id: &SubscriptionId) -> Option<Arc<Subscription>> {
        self.subscriptions.lock().get(id).cloned()
    }

    /// Copy of the current subscriptions, taken under the lock and released
    /// before the caller does anything with it.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Subscription>> {
        self.subscriptions.lock().values().cloned().collect()
    }

    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.subscriptions.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
