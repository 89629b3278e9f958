use std::sync::{PoisonError, RwLock};

use futures::future::{self, BoxFuture, FutureExt};
use uuid::Uuid;

use crate::booking::{Booking, NewBooking};
use crate::errors::BackendError;
use crate::event::{Event, NewEvent};
use crate::timestamps::Times;

/// Events and bookings kept in process memory, with the same slug
/// uniqueness rule as the PostgreSQL schema. Used by the tests and
/// handy for trying the API without a database.
#[derive(Default)]
pub struct MemoryDb {
    /// Events in insertion order.
    events: RwLock<Vec<Event>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Default::default()
    }
}

fn ready<'a, T: Send + 'a>(result: Result<T, BackendError>) -> BoxFuture<'a, Result<T, BackendError>> {
    future::ready(result).boxed()
}

impl super::Db for MemoryDb {
    fn count_bookings(&self, event_id: &Uuid) -> BoxFuture<Result<i64, BackendError>> {
        let bookings = self.bookings.read().unwrap_or_else(PoisonError::into_inner);
        let count = bookings.iter().filter(|b| b.event_id() == event_id).count();

        ready(Ok(count as i64))
    }

    fn delete_booking(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let mut bookings = self.bookings.write().unwrap_or_else(PoisonError::into_inner);
        let before = bookings.len();
        bookings.retain(|b| b.id() != id);

        if bookings.len() == before {
            ready(Err(BackendError::NonExistentId(*id)))
        } else {
            ready(Ok(()))
        }
    }

    fn delete_event(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        let before = events.len();
        events.retain(|e| e.id() != id);

        if events.len() == before {
            ready(Err(BackendError::NonExistentId(*id)))
        } else {
            ready(Ok(()))
        }
    }

    fn event_exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);

        ready(Ok(events.iter().any(|e| e.id() == id)))
    }

    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<Result<Booking, BackendError>> {
        let mut bookings = self.bookings.write().unwrap_or_else(PoisonError::into_inner);
        let booking = Booking::new(Uuid::new_v4(), booking.event_id, booking.email, Times::now());
        bookings.push(booking.clone());

        ready(Ok(booking))
    }

    fn insert_event(&self, event: NewEvent) -> BoxFuture<Result<Event, BackendError>> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);

        if events.iter().any(|e| e.slug() == event.slug) {
            return ready(Err(BackendError::SlugAlreadyExists { slug: event.slug }));
        }

        let NewEvent { slug, details } = event;
        let event = Event::new(Uuid::new_v4(), slug, details, Times::now());
        events.push(event.clone());

        ready(Ok(event))
    }

    fn retrieve_event_by_slug(&self, slug: &str) -> BoxFuture<Result<Option<Event>, BackendError>> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);

        ready(Ok(events.iter().find(|e| e.slug() == slug).cloned()))
    }

    fn retrieve_events(&self) -> BoxFuture<Result<Vec<Event>, BackendError>> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);

        ready(Ok(events.iter().rev().cloned().collect()))
    }

    fn retrieve_similar_events(&self, event: &Event) -> BoxFuture<Result<Vec<Event>, BackendError>> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);

        let similar = events
            .iter()
            .rev()
            .filter(|e| e.id() != event.id() && e.shares_tag_with(event))
            .cloned()
            .collect();

        ready(Ok(similar))
    }

    fn update_event(&self, id: &Uuid, event: NewEvent) -> BoxFuture<Result<Event, BackendError>> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);

        if events.iter().any(|e| e.id() != id && e.slug() == event.slug) {
            return ready(Err(BackendError::SlugAlreadyExists { slug: event.slug }));
        }

        let existing = match events.iter_mut().find(|e| e.id() == id) {
            Some(existing) => existing,
            None => return ready(Err(BackendError::NonExistentId(*id))),
        };

        let NewEvent { slug, details } = event;
        *existing = Event::new(*id, slug, details, existing.times().touched());

        ready(Ok(existing.clone()))
    }
}
