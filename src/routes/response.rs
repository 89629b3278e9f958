use serde::Serialize;

use crate::booking::Booking;
use crate::event::Event;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Booking {
        message: &'a str,
        booking: Booking,
    },
    Count {
        count: i64,
    },
    Event {
        message: &'a str,
        event: Event,
    },
    Events {
        message: &'a str,
        events: Vec<Event>,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Similar {
        events: Vec<Event>,
    },
}
