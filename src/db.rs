use futures::future::BoxFuture;
use uuid::Uuid;

use crate::booking::{Booking, NewBooking};
use crate::errors::BackendError;
use crate::event::{Event, NewEvent};

pub mod memory;
mod postgres;

pub use self::memory::MemoryDb;
pub use self::postgres::*;

/// A database that can be shared between request handlers.
pub type SafeDb = dyn Db + Send + Sync;

/// Storage for events and bookings. Implementations enforce slug
/// uniqueness; everything else is validated before it gets here.
pub trait Db {
    fn count_bookings(&self, event_id: &Uuid) -> BoxFuture<Result<i64, BackendError>>;

    fn delete_booking(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    fn delete_event(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    fn event_exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>>;

    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<Result<Booking, BackendError>>;

    fn insert_event(&self, event: NewEvent) -> BoxFuture<Result<Event, BackendError>>;

    fn retrieve_event_by_slug(&self, slug: &str) -> BoxFuture<Result<Option<Event>, BackendError>>;

    /// All events, newest first.
    fn retrieve_events(&self) -> BoxFuture<Result<Vec<Event>, BackendError>>;

    /// Events sharing at least one tag with `event`, excluding `event`
    /// itself, newest first.
    fn retrieve_similar_events(&self, event: &Event) -> BoxFuture<Result<Vec<Event>, BackendError>>;

    fn update_event(&self, id: &Uuid, event: NewEvent) -> BoxFuture<Result<Event, BackendError>>;
}
