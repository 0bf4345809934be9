use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dispatch order. Creating one also creates the trip that tracks it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub id: Id,

    pub recipient: String,

    pub location: String,

    pub driver_id: Id,

    pub vehicle_id: Id,

    pub invoice: i64,

    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub verified: bool,
}
