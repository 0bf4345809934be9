//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

/// Errors while executing operations related to entities.
#[derive(Debug, PartialEq)]
pub struct Error {
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum EntityApiErrorKind {
    // Record not found
    RecordNotFound,
    // Record exists but no longer accepts this change. Ex. a completed trip
    RecordNotUpdated,
    // Validation error
    ValidationError(String),
}

impl Error {
    pub fn not_found() -> Self {
        Error {
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }

    pub fn not_updated() -> Self {
        Error {
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error {
            error_kind: EntityApiErrorKind::ValidationError(message.into()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}
