use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

/// What the client was trying to do when the request failed. Echoed
/// back in the error body next to the message.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Context {
    ListEvents,
    CreateEvent,
    RetrieveEvent { slug: String },
    UpdateEvent { slug: String },
    DeleteEvent { slug: String },
    CountBookings { slug: String },
    CreateBooking,
    DeleteBooking { id: String },
}

impl Context {
    pub fn list_events() -> Context {
        Context::ListEvents
    }

    pub fn create_event() -> Context {
        Context::CreateEvent
    }

    pub fn retrieve_event(slug: String) -> Context {
        Context::RetrieveEvent { slug }
    }

    pub fn update_event(slug: String) -> Context {
        Context::UpdateEvent { slug }
    }

    pub fn delete_event(slug: String) -> Context {
        Context::DeleteEvent { slug }
    }

    pub fn count_bookings(slug: String) -> Context {
        Context::CountBookings { slug }
    }

    pub fn create_booking() -> Context {
        Context::CreateBooking
    }

    pub fn delete_booking(id: String) -> Context {
        Context::DeleteBooking { id }
    }
}
