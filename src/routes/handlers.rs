use std::time::{Duration, Instant};

use log::debug;
use serde::de::DeserializeOwned;
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::actions;
use crate::booking::BookingSubmission;
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::event::EventSubmission;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn list_events(environment: Environment) -> RouteResult {
    timed! {
        let events = actions::list_events(&*environment.db)
            .await
            .map_err(|e| Rejection::new(Context::list_events(), e))?;

        json(&SuccessResponse::Events {
            message: "Events fetched successfully.",
            events,
        })
    }
}

pub async fn create_event(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create_event(), e);

        debug!(environment.logger, "Parsing event submission...");
        let submission: EventSubmission = parse_body(&body).map_err(error_handler)?;

        let event = actions::create_event(&environment.logger, &*environment.db, submission)
            .await
            .map_err(error_handler)?;
        let location = environment.urls.event(event.slug());

        with_header(
            with_status(
                json(&SuccessResponse::Event {
                    message: "Event created successfully.",
                    event,
                }),
                StatusCode::CREATED,
            ),
            "location",
            location.as_str(),
        )
    }
}

pub async fn retrieve_event(environment: Environment, slug: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve_event(slug.clone()), e);

        let event = actions::fetch_event(&*environment.db, &slug)
            .await
            .map_err(error_handler)?
            .ok_or_else(|| error_handler(BackendError::NonExistentSlug(slug.trim().to_owned())))?;

        json(&SuccessResponse::Event {
            message: "Event fetched successfully.",
            event,
        })
    }
}

pub async fn update_event(environment: Environment, slug: String, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update_event(slug.clone()), e);

        let submission: EventSubmission = parse_body(&body).map_err(error_handler)?;

        let event = actions::update_event(&environment.logger, &*environment.db, &slug, submission)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Event {
            message: "Event updated successfully.",
            event,
        })
    }
}

pub async fn delete_event(environment: Environment, slug: String) -> RouteResult {
    timed! {
        actions::delete_event(&environment.logger, &*environment.db, &slug)
            .await
            .map_err(|e| Rejection::new(Context::delete_event(slug.clone()), e))?;

        StatusCode::NO_CONTENT
    }
}

pub async fn similar_events(environment: Environment, slug: String) -> RouteResult {
    timed! {
        let events = actions::find_similar_events(&environment.logger, &*environment.db, &slug).await;

        json(&SuccessResponse::Similar { events })
    }
}

pub async fn booking_count(environment: Environment, slug: String) -> RouteResult {
    timed! {
        let count = actions::count_bookings(&*environment.db, &slug)
            .await
            .map_err(|e| Rejection::new(Context::count_bookings(slug.clone()), e))?;

        json(&SuccessResponse::Count { count })
    }
}

pub async fn create_booking(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::create_booking(), e);

        debug!(environment.logger, "Parsing booking submission...");
        let submission: BookingSubmission = parse_body(&body).map_err(error_handler)?;

        let booking = actions::create_booking(&environment.logger, &*environment.db, submission)
            .await
            .map_err(error_handler)?;

        with_status(
            json(&SuccessResponse::Booking {
                message: "Booking created successfully.",
                booking,
            }),
            StatusCode::CREATED,
        )
    }
}

pub async fn delete_booking(environment: Environment, id: String) -> RouteResult {
    timed! {
        actions::delete_booking(&environment.logger, &*environment.db, &id)
            .await
            .map_err(|e| Rejection::new(Context::delete_booking(id.clone()), e))?;

        StatusCode::NO_CONTENT
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(|e| BackendError::MalformedSubmission(e.to_string()))
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
