//! Per-connection subscription lifecycle.
//!
//! A [`Session`] moves through `Connecting -> Active -> Draining -> Closed` and
//! never back. Dropping a session always deregisters it, whichever way the
//! owning transport exits.

use crate::filter::Filter;
use crate::hub::Hub;
use crate::registry::SubscriptionId;
use events::TripEvent;
use futures::{Sink, SinkExt};
use log::*;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// How long a pump waits for its transport to close after cancellation.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    /// Cancelled or failed: the queue takes no new events.
    Draining,
    /// Removed from the registry.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => write!(f, "connecting"),
            SessionState::Active => write!(f, "active"),
            SessionState::Draining => write!(f, "draining"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Why a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    Cancelled,
    TransportError,
}

pub struct Session {
    hub: Arc<Hub>,
    id: SubscriptionId,
    receiver: Receiver<TripEvent>,
    cancel: CancellationToken,
    state: SessionState,
}

impl Session {
    /// Register a subscription with `filter` and return its active session.
    pub fn open(hub: Arc<Hub>, filter: Filter) -> Self {
        trace!("Session {}", SessionState::Connecting);
        let registration = hub.register(filter);

        Self {
            hub,
            id: registration.id,
            receiver: registration.receiver,
            cancel: registration.cancel,
            state: SessionState::Active,
        }
    }

    /// Cancel the session once `max_lifetime` has elapsed. Must be called from
    /// within a tokio runtime.
    pub fn with_max_lifetime(self, max_lifetime: Option<Duration>) -> Self {
        if let Some(limit) = max_lifetime {
            let cancel = self.cancel.clone();
            let id = self.id.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {
                        info!("Subscription {id} reached its maximum lifetime of {limit:?}");
                        cancel.cancel();
                    }
                    _ = cancel.cancelled() => {}
                }
            });
        }
        self
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A token that is cancelled when this session should end. Transports
    /// cancel it to tear the session down from another task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the next queued event.
    ///
    /// Returns `None` once the session is cancelled or unregistered, after
    /// which it is draining and no further events are handed out.
    pub async fn next_event(&mut self) -> Option<TripEvent> {
        if self.state != SessionState::Active {
            return None;
        }

        let next = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.receiver.recv() => event,
        };

        if next.is_none() {
            self.begin_drain();
        }
        next
    }

    /// Stop accepting new events. Anything already queued is discarded.
    pub fn begin_drain(&mut self) {
        if self.state == SessionState::Active {
            debug!("Subscription {} draining", self.id);
            self.receiver.close();
            self.state = SessionState::Draining;
        }
    }

    /// Forward queued events into `sink` until cancelled or a write fails.
    ///
    /// Writes are awaited one at a time so they never interleave, and each one
    /// races cancellation so a peer that stops reading cannot hold the session
    /// open. Cancelled between writes, the sink is closed within
    /// [`CLOSE_TIMEOUT`]; cancelled mid-write, it is left as is. On a write
    /// failure the session is cancelled so any sibling task of the same
    /// connection stops too.
    pub async fn pump<S, M, F>(&mut self, sink: &mut S, mut encode: F) -> PumpExit
    where
        S: Sink<M> + Unpin,
        S::Error: fmt::Display,
        F: FnMut(&TripEvent) -> Option<M>,
    {
        while let Some(event) = self.next_event().await {
            let Some(message) = encode(&event) else {
                continue;
            };

            let written = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = sink.send(message) => Some(result),
            };

            match written {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    warn!("Write to subscription {} failed: {e}", self.id);
                    self.begin_drain();
                    self.cancel.cancel();
                    return PumpExit::TransportError;
                }
                None => {
                    debug!("Subscription {} cancelled mid-write", self.id);
                    self.begin_drain();
                    return PumpExit::Cancelled;
                }
            }
        }

        match timeout(CLOSE_TIMEOUT, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Closing transport of subscription {} failed: {e}", self.id),
            Err(_) => debug!("Closing transport of subscription {} timed out", self.id),
        }
        PumpExit::Cancelled
    }

    fn finish(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.begin_drain();
        self.hub.unregister(&self.id);
        self.state = SessionState::Closed;
        debug!("Subscription {} closed", self.id);
    }

    /// Deregister now rather than on drop.
    pub fn close(mut self) {
        self.finish();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::trip;
    use futures::channel::mpsc as futures_mpsc;
    use futures::StreamExt;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn open_registers_and_drop_unregisters() {
        let hub = Arc::new(Hub::new());
        let session = Session::open(hub.clone(), Filter::All);
        let id = session.id().clone();

        assert_eq!(session.state(), SessionState::Active);
        assert!(hub.contains(&id));

        drop(session);

        assert!(!hub.contains(&id));
        assert_eq!(hub.subscription_count(), 0);
    }

    #[tokio::test]
    async fn next_event_yields_in_order_until_cancelled() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);

        hub.publish(TripEvent::created(trip(1, 7)));
        hub.publish(TripEvent::updated(trip(1, 7)));

        assert_eq!(session.next_event().await.unwrap().entity_id(), 1);
        assert_eq!(
            session.next_event().await.unwrap().kind(),
            events::EventKind::Updated
        );

        hub.publish(TripEvent::deleted(trip(1, 7)));
        session.cancel();

        assert!(session.next_event().await.is_none());
        assert_eq!(session.state(), SessionState::Draining);

        let id = session.id().clone();
        session.close();
        assert!(!hub.contains(&id));
    }

    #[tokio::test]
    async fn external_unregister_ends_the_session() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);

        hub.unregister(session.id());

        let next = timeout(WAIT, session.next_event()).await.unwrap();
        assert!(next.is_none());
        assert_eq!(session.state(), SessionState::Draining);
    }

    #[tokio::test]
    async fn draining_session_takes_no_new_events() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);

        session.begin_drain();
        let summary = hub.publish(TripEvent::created(trip(1, 7)));

        assert_eq!(summary.delivered, 0);
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn hub_shutdown_ends_the_session() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);

        hub.shutdown();

        assert!(timeout(WAIT, session.next_event()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn max_lifetime_cancels_the_session() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All)
            .with_max_lifetime(Some(Duration::from_millis(20)));

        assert!(timeout(WAIT, session.next_event()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pump_forwards_events_then_closes_sink_on_cancel() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::Driver(7));
        let id = session.id().clone();
        let cancel = session.cancel_token();
        let (mut sink, mut written) = futures_mpsc::unbounded::<String>();

        let pump = tokio::spawn(async move {
            session
                .pump(&mut sink, |event| Some(format!("trip {}", event.entity_id())))
                .await
        });

        hub.publish(TripEvent::location_changed(trip(1, 7)));
        hub.publish(TripEvent::location_changed(trip(2, 9)));
        hub.publish(TripEvent::location_changed(trip(3, 7)));

        assert_eq!(timeout(WAIT, written.next()).await.unwrap().unwrap(), "trip 1");
        assert_eq!(timeout(WAIT, written.next()).await.unwrap().unwrap(), "trip 3");

        cancel.cancel();
        assert_eq!(pump.await.unwrap(), PumpExit::Cancelled);

        assert!(timeout(WAIT, written.next()).await.unwrap().is_none());
        assert!(!hub.contains(&id));
    }

    #[tokio::test]
    async fn cancel_interrupts_a_stalled_write() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);
        let id = session.id().clone();
        let cancel = session.cancel_token();
        // Zero buffer: one message fits, the next send waits for a reader
        // that never comes.
        let (mut sink, _unread) = futures_mpsc::channel::<String>(0);

        let pump = tokio::spawn(async move {
            session
                .pump(&mut sink, |event| Some(format!("trip {}", event.entity_id())))
                .await
        });

        for trip_id in 1..=3 {
            hub.publish(TripEvent::created(trip(trip_id, 7)));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        cancel.cancel();
        let exit = timeout(WAIT, pump)
            .await
            .expect("pump stayed blocked after cancel")
            .unwrap();

        assert_eq!(exit, PumpExit::Cancelled);
        assert!(!hub.contains(&id));
    }

    #[tokio::test]
    async fn hub_shutdown_interrupts_a_stalled_write() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);
        let (mut sink, _unread) = futures_mpsc::channel::<String>(0);

        let pump = tokio::spawn(async move {
            session
                .pump(&mut sink, |event| Some(event.entity_id().to_string()))
                .await
        });

        for trip_id in 1..=3 {
            hub.publish(TripEvent::updated(trip(trip_id, 7)));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        hub.shutdown();

        let exit = timeout(WAIT, pump).await.unwrap().unwrap();
        assert_eq!(exit, PumpExit::Cancelled);
        assert_eq!(hub.subscription_count(), 0);
    }

    #[tokio::test]
    async fn pump_write_failure_cancels_and_unregisters() {
        let hub = Arc::new(Hub::new());
        let mut session = Session::open(hub.clone(), Filter::All);
        let id = session.id().clone();
        let cancel = session.cancel_token();
        let (mut sink, written) = futures_mpsc::unbounded::<String>();
        drop(written);

        hub.publish(TripEvent::created(trip(1, 7)));
        let exit = timeout(WAIT, session.pump(&mut sink, |_| Some(String::new())))
            .await
            .unwrap();

        assert_eq!(exit, PumpExit::TransportError);
        assert!(cancel.is_cancelled());
        drop(session);
        assert!(!hub.contains(&id));

        // Publishing after the subscriber is gone is still fine.
        assert_eq!(hub.publish(TripEvent::created(trip(2, 7))).delivered, 0);
    }
}
