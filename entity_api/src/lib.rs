//! Storage operations for trips and dispatches.
//!
//! The relational store is an external collaborator of the hub; `Store` keeps
//! the same records in memory so that producers have something to commit to
//! before they publish.

pub use entity::{dispatches, trip_status, trips, Id};

pub mod dispatch;
pub mod error;
pub mod store;
pub mod trip;

pub use store::Store;
