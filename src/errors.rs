use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// Enumerates the ways a submitted event or booking can fail
/// validation before anything is written.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Field \"{field}\" is required and must be a non-empty string.")]
    MissingField { field: &'static str },

    #[error("Invalid event date. Provide a valid date string.")]
    InvalidDate { date: String },

    #[error("Invalid time format. Expected HH:mm (24-hour clock).")]
    InvalidTime { time: String },

    #[error("Hour must be between 0 and 23.")]
    HourOutOfRange { hour: u32 },

    #[error("Minutes must be between 0 and 59.")]
    MinuteOutOfRange { minute: u32 },

    #[error("Title must contain at least one letter or digit.")]
    EmptySlug,

    #[error("Agenda must contain at least one non-empty item.")]
    EmptyAgenda,

    #[error("Tags must contain at least one non-empty item.")]
    EmptyTags,

    #[error("A valid, non-empty email is required.")]
    InvalidEmail,
}

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A required setting was absent from the environment.
    #[error("Invalid or missing environment variable: \"{name}\"")]
    MissingConfiguration { name: String },

    /// The database could not be reached. Shared between every caller
    /// that was waiting on the same connection attempt.
    #[error("Failed to connect to database")]
    Connection { source: Arc<sqlx::Error> },

    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("An event with the slug {slug:?} already exists.")]
    SlugAlreadyExists { slug: String },

    #[error("Referenced event does not exist.")]
    NonExistentEvent { id: Uuid },

    #[error("Invalid ID: {0}")]
    InvalidId(String),

    #[error("No record with ID {0}")]
    NonExistentId(Uuid),

    #[error("Event not found for the given slug.")]
    NonExistentSlug(String),

    #[error("Malformed submission: {0}")]
    MalformedSubmission(String),
}

impl BackendError {
    /// Whether the caller supplied bad data, as opposed to the backend
    /// failing.
    pub fn is_client_error(&self) -> bool {
        use BackendError::*;

        matches!(
            self,
            Validation(..)
                | SlugAlreadyExists { .. }
                | NonExistentEvent { .. }
                | InvalidId(..)
                | NonExistentId(..)
                | NonExistentSlug(..)
                | MalformedSubmission(..)
        )
    }
}
