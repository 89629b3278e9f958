//! The operations offered to the HTTP layer and the helper binaries.
//! Each one validates its input explicitly before touching the
//! database.

use log::{debug, error, o, Logger};
use uuid::Uuid;

use crate::booking::{Booking, BookingSubmission};
use crate::db::SafeDb;
use crate::errors::BackendError;
use crate::event::{Event, EventSubmission};

/// Validates and stores a new event. Any slug in the submission is
/// replaced by one derived from the title.
pub async fn create_event(
    logger: &Logger,
    db: &SafeDb,
    submission: EventSubmission,
) -> Result<Event, BackendError> {
    let event = submission.validate(None)?;
    let logger = logger.new(o!("slug" => event.slug().to_owned()));

    debug!(logger, "Writing event to database...");
    db.insert_event(event).await
}

/// Replaces the fields of the event currently at `slug`. The slug is
/// regenerated only if the title changed.
pub async fn update_event(
    logger: &Logger,
    db: &SafeDb,
    slug: &str,
    submission: EventSubmission,
) -> Result<Event, BackendError> {
    let existing = require_event(db, slug).await?;
    let event = submission.validate(Some(&existing))?;

    debug!(logger, "Updating event..."; "id" => %existing.id(), "slug" => event.slug());
    db.update_event(existing.id(), event).await
}

pub async fn delete_event(logger: &Logger, db: &SafeDb, slug: &str) -> Result<(), BackendError> {
    let existing = require_event(db, slug).await?;

    debug!(logger, "Deleting event..."; "id" => %existing.id(), "slug" => existing.slug());
    db.delete_event(existing.id()).await
}

/// Looks up an event by slug. Surrounding whitespace is ignored.
pub async fn fetch_event(db: &SafeDb, slug: &str) -> Result<Option<Event>, BackendError> {
    let slug = slug.trim();

    if slug.is_empty() {
        return Err(BackendError::MalformedSubmission(
            "Slug parameter is required and must be non-empty.".to_owned(),
        ));
    }

    db.retrieve_event_by_slug(slug).await
}

/// All events, newest first.
pub async fn list_events(db: &SafeDb) -> Result<Vec<Event>, BackendError> {
    db.retrieve_events().await
}

/// Validates a booking and stores it if the event it names exists.
pub async fn create_booking(
    logger: &Logger,
    db: &SafeDb,
    submission: BookingSubmission,
) -> Result<Booking, BackendError> {
    let booking = submission.validate()?;
    let logger = logger.new(o!("event_id" => booking.event_id().to_string()));

    debug!(logger, "Checking event exists...");
    if !db.event_exists(booking.event_id()).await? {
        return Err(BackendError::NonExistentEvent {
            id: *booking.event_id(),
        });
    }

    debug!(logger, "Writing booking to database...");
    db.insert_booking(booking).await
}

pub async fn delete_booking(logger: &Logger, db: &SafeDb, id: &str) -> Result<(), BackendError> {
    let id = Uuid::parse_str(id.trim()).map_err(|_| BackendError::InvalidId(id.to_owned()))?;

    debug!(logger, "Deleting booking..."; "id" => %id);
    db.delete_booking(&id).await
}

/// The number of bookings for the event at `slug`.
pub async fn count_bookings(db: &SafeDb, slug: &str) -> Result<i64, BackendError> {
    let event = require_event(db, slug).await?;

    db.count_bookings(event.id()).await
}

/// Events sharing at least one tag with the event at `slug`. An
/// unknown slug or a failed lookup yields no events; failures are only
/// logged.
pub async fn find_similar_events(logger: &Logger, db: &SafeDb, slug: &str) -> Vec<Event> {
    let result = match fetch_event(db, slug).await {
        Ok(Some(event)) => db.retrieve_similar_events(&event).await,
        Ok(None) => Ok(vec![]),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        error!(logger, "Error fetching similar events"; "slug" => slug, "error" => %e);
        vec![]
    })
}

async fn require_event(db: &SafeDb, slug: &str) -> Result<Event, BackendError> {
    fetch_event(db, slug)
        .await?
        .ok_or_else(|| BackendError::NonExistentSlug(slug.trim().to_owned()))
}
