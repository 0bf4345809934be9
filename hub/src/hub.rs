use crate::filter::Filter;
use crate::registry::{Offer, Registry, Subscription, SubscriptionId};
use events::TripEvent;
use log::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;

/// Per-subscription queue depth used when none is configured.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Everything a transport needs to serve a freshly registered subscription.
pub struct Registration {
    pub id: SubscriptionId,
    pub receiver: Receiver<TripEvent>,
    /// Cancelled when the subscription is unregistered or the hub shuts down.
    pub cancel: CancellationToken,
}

/// Outcome of a single `publish` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub active_subscriptions: usize,
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
}

pub struct Hub {
    registry: Registry,
    queue_capacity: usize,
    shutdown: CancellationToken,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl Hub {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            registry: Registry::new(),
            queue_capacity: queue_capacity.max(1),
            shutdown: CancellationToken::new(),
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Register a new subscription and return its handle and queue.
    /// The subscription receives events from the next `publish` onwards.
    pub fn register(&self, filter: Filter) -> Registration {
        let id = SubscriptionId::new();
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let cancel = self.shutdown.child_token();

        debug!("Registering subscription {id} with filter {filter:?}");

        self.registry.insert(Arc::new(Subscription::new(
            id.clone(),
            filter,
            sender,
            cancel.clone(),
        )));

        info!(
            "Registered subscription {id} ({} active)",
            self.registry.len()
        );

        Registration {
            id,
            receiver,
            cancel,
        }
    }

    /// Unregister a subscription by ID and signal its pump to stop.
    ///
    /// Returns whether the subscription was present; unknown or already
    /// removed handles are a no-op.
    pub fn unregister(&self, id: &SubscriptionId) -> bool {
        match self.registry.remove(id) {
            Some(subscription) => {
                subscription.cancel();
                info!(
                    "Unregistered subscription {id} ({} active)",
                    self.registry.len()
                );
                true
            }
            None => {
                trace!("Subscription {id} already unregistered");
                false
            }
        }
    }

    /// Replace the filter of a live subscription.
    pub fn update_filter(&self, id: &SubscriptionId, filter: Filter) -> bool {
        match self.registry.get(id) {
            Some(subscription) => {
                debug!("Subscription {id} now filters on {filter:?}");
                subscription.set_filter(filter);
                true
            }
            None => {
                warn!("Cannot update filter of unknown subscription {id}");
                false
            }
        }
    }

    /// Fan `event` out to every subscription whose filter accepts it.
    ///
    /// Never blocks and never fails: a subscriber whose queue is full loses
    /// this event and nobody else is affected.
    pub fn publish(&self, event: TripEvent) -> PublishSummary {
        self.published.fetch_add(1, Ordering::Relaxed);

        let mut summary = PublishSummary::default();
        for subscription in self.registry.snapshot() {
            match subscription.offer(&event) {
                Offer::Delivered => summary.delivered += 1,
                Offer::Dropped => summary.dropped += 1,
                Offer::Filtered | Offer::Closed => {}
            }
        }

        self.delivered
            .fetch_add(summary.delivered as u64, Ordering::Relaxed);
        self.dropped
            .fetch_add(summary.dropped as u64, Ordering::Relaxed);

        debug!(
            "Published {} event for trip {} to {} subscriber(s), {} dropped",
            event.kind(),
            event.entity_id(),
            summary.delivered,
            summary.dropped
        );

        summary
    }

    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.registry.contains(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            active_subscriptions: self.registry.len(),
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    /// Cancel every session derived from this hub. Sessions deregister
    /// themselves as they wind down.
    pub fn shutdown(&self) {
        info!(
            "Shutting down hub with {} active subscription(s)",
            self.registry.len()
        );
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trip;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn registered_subscriber_receives_events_in_publish_order() {
        let hub = Hub::new();
        let mut registration = hub.register(Filter::All);

        for id in 1..=5 {
            hub.publish(TripEvent::updated(trip(id, 7)));
        }

        for id in 1..=5 {
            let event = registration.receiver.try_recv().unwrap();
            assert_eq!(event.entity_id(), id);
        }
        assert!(registration.receiver.try_recv().is_err());
    }

    #[test]
    fn broadcast_subscriber_receives_trip_created() {
        let hub = Hub::new();
        let mut b = hub.register(Filter::All);
        let created = TripEvent::created(trip(1, 3));

        let summary = hub.publish(created.clone());

        assert_eq!(summary.delivered, 1);
        assert_eq!(b.receiver.try_recv().unwrap(), created);
    }

    #[test]
    fn driver_filter_only_sees_its_driver() {
        let hub = Hub::new();
        let mut f = hub.register(Filter::Nothing);

        hub.publish(TripEvent::location_changed(trip(1, 7)));
        assert!(f.receiver.try_recv().is_err());

        assert!(hub.update_filter(&f.id, Filter::Driver(7)));
        hub.publish(TripEvent::location_changed(trip(1, 7)));
        hub.publish(TripEvent::location_changed(trip(2, 9)));

        let received = f.receiver.try_recv().unwrap();
        assert_eq!(received.driver_id(), 7);
        assert!(f.receiver.try_recv().is_err());
    }

    #[test]
    fn full_queue_drops_without_blocking_or_affecting_others() {
        let hub = Hub::with_queue_capacity(DEFAULT_QUEUE_CAPACITY);
        let mut slow = hub.register(Filter::Driver(7));
        let mut fast = hub.register(Filter::All);

        for id in 0..DEFAULT_QUEUE_CAPACITY as i64 {
            hub.publish(TripEvent::location_changed(trip(id, 7)));
            fast.receiver.try_recv().unwrap();
        }

        let started = Instant::now();
        let summary = hub.publish(TripEvent::location_changed(trip(99, 7)));
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(summary, PublishSummary { delivered: 1, dropped: 1 });
        assert_eq!(fast.receiver.try_recv().unwrap().entity_id(), 99);

        let mut queued = Vec::new();
        while let Ok(event) = slow.receiver.try_recv() {
            queued.push(event.entity_id());
        }
        assert_eq!(queued.len(), DEFAULT_QUEUE_CAPACITY);
        assert!(!queued.contains(&99));
        assert_eq!(hub.stats().dropped, 1);
    }

    #[test]
    fn unregister_is_idempotent_and_stops_delivery() {
        let hub = Hub::new();
        let mut a = hub.register(Filter::All);
        let _b = hub.register(Filter::All);
        assert_eq!(hub.subscription_count(), 2);

        assert!(hub.unregister(&a.id));
        assert_eq!(hub.subscription_count(), 1);
        assert!(a.cancel.is_cancelled());

        assert!(!hub.unregister(&a.id));
        assert_eq!(hub.subscription_count(), 1);

        let summary = hub.publish(TripEvent::created(trip(1, 7)));
        assert_eq!(summary.delivered, 1);
        // Sender was dropped with the subscription, so the queue is closed.
        assert!(a.receiver.try_recv().is_err());
        assert!(!hub.contains(&a.id));
    }

    #[test]
    fn update_filter_on_unknown_subscription_is_rejected() {
        let hub = Hub::new();
        let registration = hub.register(Filter::Nothing);
        hub.unregister(&registration.id);

        assert!(!hub.update_filter(&registration.id, Filter::Driver(1)));
    }

    #[test]
    fn closed_queue_is_skipped() {
        let hub = Hub::new();
        let mut registration = hub.register(Filter::All);
        registration.receiver.close();

        let summary = hub.publish(TripEvent::created(trip(1, 7)));

        assert_eq!(summary, PublishSummary::default());
        assert!(hub.contains(&registration.id));
    }

    #[test]
    fn shutdown_cancels_every_registration() {
        let hub = Hub::new();
        let a = hub.register(Filter::All);
        let b = hub.register(Filter::Driver(4));

        hub.shutdown();

        assert!(hub.is_shut_down());
        assert!(a.cancel.is_cancelled());
        assert!(b.cancel.is_cancelled());
    }

    #[test]
    fn stats_track_publish_activity() {
        let hub = Hub::new();
        let _a = hub.register(Filter::All);
        let _b = hub.register(Filter::Driver(1));

        hub.publish(TripEvent::created(trip(1, 1)));
        hub.publish(TripEvent::created(trip(2, 2)));

        assert_eq!(
            hub.stats(),
            HubStats {
                active_subscriptions: 2,
                published: 2,
                delivered: 3,
                dropped: 0,
            }
        );
    }

    #[test]
    fn concurrent_register_unregister_and_publish_keep_registry_consistent() {
        let hub = Arc::new(Hub::with_queue_capacity(4));
        let keeper = hub.register(Filter::All);

        let churners: Vec<_> = (0..4)
            .map(|_| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let registration = hub.register(Filter::All);
                        assert!(hub.contains(&registration.id));
                        assert!(hub.unregister(&registration.id));
                    }
                })
            })
            .collect();

        let publishers: Vec<_> = (0..2)
            .map(|n| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || {
                    for id in 0..200 {
                        hub.publish(TripEvent::updated(trip(id, n)));
                    }
                })
            })
            .collect();

        for handle in churners.into_iter().chain(publishers) {
            handle.join().unwrap();
        }

        assert_eq!(hub.subscription_count(), 1);
        assert!(hub.contains(&keeper.id));
        assert_eq!(hub.stats().published, 400);
    }
}
