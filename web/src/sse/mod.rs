//! Broadcast event stream for admin dashboards.
//!
//! Every connection gets its own hub session with an accept-all filter; the
//! hub itself lives in the `hub` crate.

pub mod handler;
