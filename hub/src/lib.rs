//! In-process event distribution for trip state changes.
//!
//! This crate fans committed trip events out to every connected observer
//! without letting a slow observer hold up the producer or anyone else.
//!
//! # Architecture
//!
//! - **Registry**: the set of live subscriptions behind a single mutex. The
//!   lock is held only to mutate the map or copy a snapshot of it.
//! - **Hub**: owns the registry. Producers call [`Hub::publish`], transports
//!   call [`Hub::register`] / [`Hub::unregister`].
//! - **Filter**: decides per subscription whether an event is relevant.
//!   Broadcast observers accept everything, driver channels accept only their
//!   driver's trips.
//! - **Session**: one transport connection's view of its subscription. Owns the
//!   receiving end of the bounded queue and deregisters on drop, so every exit
//!   path releases the subscription.
//!
//! # Delivery
//!
//! 1. A producer commits a trip mutation and publishes a `TripEvent`
//! 2. The hub snapshots the registry and releases the lock
//! 3. Each accepting subscription gets a non-blocking enqueue; a full queue
//!    drops the event for that subscriber only
//! 4. The session's pump drains its queue in FIFO order and writes each
//!    event's [`message::Envelope`] to its transport
//!
//! Events are ephemeral: an observer that is disconnected or too slow simply
//! misses them.
//!
//! # Modules
//!
//! - `registry`: `Registry` and the opaque `SubscriptionId` handle
//! - `hub`: registration, filter updates, fan-out and counters
//! - `filter`: subscription filter predicates
//! - `message`: outbound envelopes and inbound control messages
//! - `session`: per-connection lifecycle and pump
//! - `event_handler`: bridges `events::EventPublisher` into the hub

pub mod event_handler;
pub mod filter;
pub mod hub;
pub mod message;
pub mod registry;
pub mod session;

pub use event_handler::HubEventHandler;
pub use filter::Filter;
pub use hub::{Hub, HubStats, PublishSummary, Registration, DEFAULT_QUEUE_CAPACITY};
pub use registry::SubscriptionId;
pub use session::{PumpExit, Session, SessionState};
