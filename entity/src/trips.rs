//! Trip state as relayed to hub subscribers.

use crate::trip_status::TripStatus;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Id,

    pub dispatch_id: Id,

    pub driver_id: Id,

    pub vehicle_id: Id,

    pub destination: String,

    pub recipient_name: String,

    pub status: TripStatus,

    pub latitude: f64,

    pub longitude: f64,

    /// Time of the last committed mutation of this trip
    pub last_updated: DateTime<Utc>,
}

impl Model {
    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed
    }
}
