use entity::trips::Model as TripState;
use entity::Id;
use events::{EventKind, TripEvent};
use serde::{Deserialize, Serialize};

/// SSE event name of the frame sent once when a stream opens.
pub const CONNECTED_EVENT: &str = "connected";
/// Data of the `connected` frame, a JSON string.
pub const CONNECTED_MARKER: &str = "SSE connected";
/// SSE event name every trip envelope is sent under.
pub const MESSAGE_EVENT: &str = "message";

/// Outbound representation of a `TripEvent`, shared by both transports.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Envelope<'a> {
    #[serde(rename = "trip_created")]
    TripCreated { trip: &'a TripState },
    #[serde(rename = "trip_updated")]
    TripUpdated { trip: &'a TripState },
    #[serde(rename = "trip_deleted")]
    TripDeleted {
        #[serde(rename = "tripId")]
        trip_id: Id,
    },
    #[serde(rename = "trip_completed")]
    TripCompleted {
        #[serde(rename = "tripId")]
        trip_id: Id,
    },
    #[serde(rename = "location_update")]
    LocationUpdate { trip: &'a TripState },
}

impl<'a> From<&'a TripEvent> for Envelope<'a> {
    fn from(event: &'a TripEvent) -> Self {
        match event.kind() {
            EventKind::Created => Envelope::TripCreated {
                trip: event.payload(),
            },
            EventKind::Updated => Envelope::TripUpdated {
                trip: event.payload(),
            },
            EventKind::Deleted => Envelope::TripDeleted {
                trip_id: event.entity_id(),
            },
            EventKind::Completed => Envelope::TripCompleted {
                trip_id: event.entity_id(),
            },
            EventKind::LocationChanged => Envelope::LocationUpdate {
                trip: event.payload(),
            },
        }
    }
}

impl Envelope<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Control and update messages a driver channel may send.
///
/// Decoding is closed: any other `type` tag is an error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        #[serde(rename = "driverId")]
        driver_id: Id,
    },
    UpdateLocation {
        #[serde(rename = "tripId")]
        trip_id: Id,
        latitude: f64,
        longitude: f64,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
