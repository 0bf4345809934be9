//! Per-driver WebSocket channel.
//!
//! A connection starts subscribed to nothing. A `subscribe` message scopes it to
//! one driver's trips and `update_location` messages feed position updates back
//! through the domain layer.

pub mod handler;
