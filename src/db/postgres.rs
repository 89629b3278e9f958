use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::{
    self,
    postgres::{PgArguments, PgPool, PgRow},
    query::QueryAs,
    Postgres,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::booking::{Booking, NewBooking};
use crate::connection::ConnectionCache;
use crate::errors::BackendError;
use crate::event::{Event, EventDetails, NewEvent};
use crate::timestamps::Times;

/// Must match the unique constraint declared in
/// `migrations/2025-11-01-090000_create_events/up.sql`.
const EVENTS_SLUG_CONSTRAINT: &str = "events_slug";

/// Events and bookings stored in PostgreSQL. The pool is opened on
/// first use and shared from then on.
pub struct PgDb {
    connections: Arc<ConnectionCache<PgPool>>,
}

impl PgDb {
    pub fn new(connections: Arc<ConnectionCache<PgPool>>) -> Self {
        PgDb { connections }
    }

    async fn pool(&self) -> Result<PgPool, BackendError> {
        self.connections.get().await
    }
}

// these can be simplified once async functions in traits are stabilized
impl super::Db for PgDb {
    fn count_bookings(&self, event_id: &Uuid) -> BoxFuture<Result<i64, BackendError>> {
        let event_id = *event_id;

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query_as::<_, (i64,)>(include_str!("queries/count_bookings.sql"));

            let (count,) = query
                .bind(event_id)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(count)
        }
        .boxed()
    }

    fn delete_booking(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query(include_str!("queries/delete_booking.sql"));

            let count = query
                .bind(id)
                .execute(&pool)
                .await
                .map_err(map_sqlx_error)?
                .rows_affected();

            if count == 0 {
                Err(BackendError::NonExistentId(id))
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    fn delete_event(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query(include_str!("queries/delete_event.sql"));

            let count = query
                .bind(id)
                .execute(&pool)
                .await
                .map_err(map_sqlx_error)?
                .rows_affected();

            if count == 0 {
                Err(BackendError::NonExistentId(id))
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    fn event_exists(&self, id: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
        let id = *id;

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query_as::<_, (bool,)>(include_str!("queries/event_exists.sql"));

            let (exists,) = query
                .bind(id)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(exists)
        }
        .boxed()
    }

    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<Result<Booking, BackendError>> {
        async move {
            let pool = self.pool().await?;
            let query = sqlx::query_as(include_str!("queries/insert_booking.sql"));

            let (id, created_at, updated_at): (Uuid, OffsetDateTime, OffsetDateTime) = query
                .bind(booking.event_id)
                .bind(&booking.email)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(Booking::new(
                id,
                booking.event_id,
                booking.email,
                Times::new(created_at, updated_at),
            ))
        }
        .boxed()
    }

    fn insert_event(&self, event: NewEvent) -> BoxFuture<Result<Event, BackendError>> {
        async move {
            let pool = self.pool().await?;
            let query = sqlx::query_as(include_str!("queries/insert_event.sql"));

            let (id, created_at, updated_at): (Uuid, OffsetDateTime, OffsetDateTime) =
                bind_event(query, &event)
                    .fetch_one(&pool)
                    .await
                    .map_err(|e| map_event_error(e, &event.slug))?;

            let NewEvent { slug, details } = event;

            Ok(Event::new(id, slug, details, Times::new(created_at, updated_at)))
        }
        .boxed()
    }

    fn retrieve_event_by_slug(&self, slug: &str) -> BoxFuture<Result<Option<Event>, BackendError>> {
        let slug = slug.to_owned();

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query(include_str!("queries/retrieve_event_by_slug.sql"));

            let event = query
                .bind(&slug)
                .try_map(|row: PgRow| event_from_row(&row))
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(event)
        }
        .boxed()
    }

    fn retrieve_events(&self) -> BoxFuture<Result<Vec<Event>, BackendError>> {
        async move {
            let pool = self.pool().await?;
            let query = sqlx::query(include_str!("queries/retrieve_events.sql"));

            let events = query
                .try_map(|row: PgRow| event_from_row(&row))
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(events)
        }
        .boxed()
    }

    fn retrieve_similar_events(&self, event: &Event) -> BoxFuture<Result<Vec<Event>, BackendError>> {
        let id = *event.id();
        let tags = event.details().tags.clone();

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query(include_str!("queries/retrieve_similar_events.sql"));

            let events = query
                .bind(id)
                .bind(&tags)
                .try_map(|row: PgRow| event_from_row(&row))
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(events)
        }
        .boxed()
    }

    fn update_event(&self, id: &Uuid, event: NewEvent) -> BoxFuture<Result<Event, BackendError>> {
        let id = *id;

        async move {
            let pool = self.pool().await?;
            let query = sqlx::query_as(include_str!("queries/update_event.sql"));

            let times: Option<(OffsetDateTime, OffsetDateTime)> = bind_event(query.bind(id), &event)
                .fetch_optional(&pool)
                .await
                .map_err(|e| map_event_error(e, &event.slug))?;

            let (created_at, updated_at) = times.ok_or(BackendError::NonExistentId(id))?;
            let NewEvent { slug, details } = event;

            Ok(Event::new(id, slug, details, Times::new(created_at, updated_at)))
        }
        .boxed()
    }
}

/// Binds the slug and details in the column order shared by the
/// insert and update queries.
fn bind_event<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    event: &'q NewEvent,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    let details = &event.details;

    query
        .bind(&event.slug)
        .bind(&details.title)
        .bind(&details.description)
        .bind(&details.overview)
        .bind(&details.image)
        .bind(&details.venue)
        .bind(&details.location)
        .bind(&details.date)
        .bind(&details.time)
        .bind(&details.mode)
        .bind(&details.audience)
        .bind(&details.agenda)
        .bind(&details.organizer)
        .bind(&details.tags)
}

fn event_from_row(row: &PgRow) -> Result<Event, sqlx::Error> {
    let details = EventDetails {
        title: try_get(row, "title")?,
        description: try_get(row, "description")?,
        overview: try_get(row, "overview")?,
        image: try_get(row, "image")?,
        venue: try_get(row, "venue")?,
        location: try_get(row, "location")?,
        date: try_get(row, "date")?,
        time: try_get(row, "time")?,
        mode: try_get(row, "mode")?,
        audience: try_get(row, "audience")?,
        agenda: try_get(row, "agenda")?,
        organizer: try_get(row, "organizer")?,
        tags: try_get(row, "tags")?,
    };

    let times = Times::new(try_get(row, "created_at")?, try_get(row, "updated_at")?);

    Ok(Event::new(
        try_get(row, "id")?,
        try_get(row, "slug")?,
        details,
        times,
    ))
}

fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
    row: &'a PgRow,
    column: &str,
) -> Result<T, sqlx::Error> {
    use sqlx::prelude::*;

    row.try_get(column)
}

fn map_event_error(error: sqlx::Error, slug: &str) -> BackendError {
    use sqlx::Error;

    match error {
        Error::Database(ref e) if e.constraint() == Some(EVENTS_SLUG_CONSTRAINT) => {
            BackendError::SlugAlreadyExists {
                slug: slug.to_owned(),
            }
        }
        _ => map_sqlx_error(error),
    }
}

fn map_sqlx_error(error: sqlx::Error) -> BackendError {
    BackendError::Sqlx { source: error }
}

#[cfg(test)]
mod tests {
    use super::EVENTS_SLUG_CONSTRAINT;

    const CREATE_EVENTS: &str =
        include_str!("../../migrations/2025-11-01-090000_create_events/up.sql");

    #[test]
    fn slug_constraint_matches_the_schema() {
        let declaration = format!("CONSTRAINT {} UNIQUE (slug)", EVENTS_SLUG_CONSTRAINT);

        assert!(
            CREATE_EVENTS.contains(&declaration),
            "events migration declares {:?}",
            declaration
        );
    }
}
