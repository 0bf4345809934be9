use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a trip. Once `Completed`, a trip accepts no further location updates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Deserialize, Serialize)]
pub enum TripStatus {
    #[serde(rename = "started")]
    #[default]
    Started,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TripStatusParseError(pub String);

impl fmt::Display for TripStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid trip status: {}", self.0)
    }
}

impl std::error::Error for TripStatusParseError {}

impl FromStr for TripStatus {
    type Err = TripStatusParseError;

    fn from_str(status: &str) -> Result<TripStatus, Self::Err> {
        match status.to_lowercase().as_str() {
            "started" => Ok(TripStatus::Started),
            "in-progress" => Ok(TripStatus::InProgress),
            "completed" => Ok(TripStatus::Completed),
            other => Err(TripStatusParseError(other.to_string())),
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripStatus::Started => write!(fmt, "started"),
            TripStatus::InProgress => write!(fmt, "in-progress"),
            TripStatus::Completed => write!(fmt, "completed"),
        }
    }
}
