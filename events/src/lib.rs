//! Event system infrastructure for the dispatch hub.
//!
//! This crate decouples the trip producers from the delivery machinery that
//! fans events out to connected observers.
//!
//! # Architecture
//!
//! - **TripEvent**: an immutable record of one committed trip state change
//! - **EventHandler**: trait for anything that consumes published events
//! - **EventPublisher**: hands each event to every registered handler
//!
//! Producers only ever see `EventPublisher`; they have no knowledge of the
//! hub, its subscriptions or their transports.

use entity::trips::Model as TripState;
use entity::Id;
use log::*;
use std::fmt;
use std::sync::Arc;

/// The kind of state change a `TripEvent` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
    Completed,
    LocationChanged,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Created => write!(f, "created"),
            EventKind::Updated => write!(f, "updated"),
            EventKind::Deleted => write!(f, "deleted"),
            EventKind::Completed => write!(f, "completed"),
            EventKind::LocationChanged => write!(f, "location_changed"),
        }
    }
}

/// A committed change to a trip.
///
/// Fields are private so an event cannot be altered after construction; every
/// subscriber receives its own clone.
#[derive(Debug, Clone, PartialEq)]
pub struct TripEvent {
    kind: EventKind,
    entity_id: Id,
    payload: TripState,
}

impl TripEvent {
    pub fn new(kind: EventKind, payload: TripState) -> Self {
        Self {
            kind,
            entity_id: payload.id,
            payload,
        }
    }

    pub fn created(trip: TripState) -> Self {
        Self::new(EventKind::Created, trip)
    }

    pub fn updated(trip: TripState) -> Self {
        Self::new(EventKind::Updated, trip)
    }

    /// Carries the last known state of the removed trip so that filters keyed
    /// on the driver still apply.
    pub fn deleted(trip: TripState) -> Self {
        Self::new(EventKind::Deleted, trip)
    }

    pub fn completed(trip: TripState) -> Self {
        Self::new(EventKind::Completed, trip)
    }

    pub fn location_changed(trip: TripState) -> Self {
        Self::new(EventKind::LocationChanged, trip)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn entity_id(&self) -> Id {
        self.entity_id
    }

    pub fn payload(&self) -> &TripState {
        &self.payload
    }

    pub fn driver_id(&self) -> Id {
        self.payload.driver_id
    }
}

/// Trait for handling published events.
///
/// `handle` runs on the producer's task, so implementations must return
/// promptly and must never wait on a consumer.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &TripEvent);
}

/// Publishes trip events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn publish(&self, event: TripEvent) {
        trace!(
            "Publishing {} event for trip {} to {} handler(s)",
            event.kind(),
            event.entity_id(),
            self.handlers.len()
        );

        for handler in self.handlers.iter() {
            handler.handle(&event);
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
