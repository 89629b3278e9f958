use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BackendError, ValidationError};
use crate::timestamps::Times;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("compile email pattern");
}

/// A single booking in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Booking {
    /// The ID of the booking.
    id: Uuid,

    /// The ID of the event booked. Checked once, when the booking is
    /// created.
    event_id: Uuid,

    /// The trimmed email address provided.
    email: String,

    /// The times it was created and updated.
    #[serde(flatten)]
    times: Times,
}

impl Booking {
    pub fn new(id: Uuid, event_id: Uuid, email: String, times: Times) -> Self {
        Booking {
            id,
            event_id,
            email,
            times,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn event_id(&self) -> &Uuid {
        &self.event_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn times(&self) -> &Times {
        &self.times
    }
}

/// A booking that has passed validation. The event it refers to has
/// not been checked yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBooking {
    pub(crate) event_id: Uuid,
    pub(crate) email: String,
}

impl NewBooking {
    pub fn event_id(&self) -> &Uuid {
        &self.event_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A booking as submitted by a client.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BookingSubmission {
    #[serde(default, alias = "eventId")]
    pub event_id: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl BookingSubmission {
    pub fn new(event_id: impl Into<String>, email: impl Into<String>) -> Self {
        BookingSubmission {
            event_id: Some(event_id.into()),
            email: Some(email.into()),
        }
    }

    /// Parses the event ID and checks the email address.
    pub fn validate(self) -> Result<NewBooking, BackendError> {
        let raw_id = self.event_id.unwrap_or_default();
        let event_id = Uuid::parse_str(raw_id.trim()).map_err(|_| BackendError::InvalidId(raw_id.clone()))?;

        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;

        Ok(NewBooking { event_id, email })
    }
}

/// Trims an email address and checks it has the shape
/// `local@domain.tld` with no whitespace.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();

    if is_valid_email(email) {
        Ok(email.to_owned())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed() {
        assert_eq!(
            normalize_email("  valid.user@example.com \n"),
            Ok("valid.user@example.com".to_owned())
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in &[
            "",
            "   ",
            "invalid-email-format",
            "user@example",
            "user@@example.com",
            "us er@example.com",
            "@example.com",
            "user@.com",
        ] {
            let error = normalize_email(email).expect_err("reject malformed email");
            assert_eq!(error.to_string(), "A valid, non-empty email is required.", "{:?}", email);
        }
    }

    #[test]
    fn submissions_need_a_parseable_event_id() {
        let event_id = Uuid::new_v4();

        let booking = BookingSubmission::new(event_id.to_string(), " someone@example.org ")
            .validate()
            .expect("validate booking");
        assert_eq!(booking.event_id(), &event_id);
        assert_eq!(booking.email(), "someone@example.org");

        match BookingSubmission::new("not-an-id", "someone@example.org").validate() {
            Err(BackendError::InvalidId(id)) => assert_eq!(id, "not-an-id"),
            other => panic!("expected invalid ID, got {:?}", other),
        }

        match BookingSubmission::new(event_id.to_string(), "invalid-email-format").validate() {
            Err(BackendError::Validation(ValidationError::InvalidEmail)) => {}
            other => panic!("expected invalid email, got {:?}", other),
        }
    }

    #[test]
    fn submissions_accept_camel_case_event_ids() {
        let submission: BookingSubmission = serde_json::from_str(
            r#"{"eventId": "6f1c1f5e-7a39-4a55-9a55-3f2b8f2a6a10", "email": "a@b.co"}"#,
        )
        .expect("parse submission");

        assert_eq!(
            submission.event_id.as_deref(),
            Some("6f1c1f5e-7a39-4a55-9a55-3f2b8f2a6a10")
        );
    }
}
