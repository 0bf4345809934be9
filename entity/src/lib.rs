//! Plain data records shared by every layer of the dispatch hub.
//!
//! These types carry no storage behavior of their own; `entity_api` owns the
//! in-memory store and `events` relays `trips::Model` values to subscribers.

pub mod dispatches;
pub mod trip_status;
pub mod trips;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = i64;
