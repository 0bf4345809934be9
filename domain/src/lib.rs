//! Trip and dispatch operations: the producers of hub events.
//!
//! Every state-changing operation commits to the store first and publishes
//! the matching `TripEvent` only once the commit succeeded.
//!
//! Consumers of this crate do not need to depend on `entity_api` directly;
//! the record types are re-exported here.
pub use entity_api::{dispatches, trip_status, trips, Id, Store};

pub mod dispatch;
pub mod error;
pub mod trip;
