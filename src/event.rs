use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{Date, Format, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::normalization;
use crate::timestamps::Times;

lazy_static! {
    static ref TIME_PATTERN: Regex =
        Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("compile time pattern");
}

/// Date-only layouts accepted on submission, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%F",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %-d, %Y",
    "%b %d, %Y",
    "%b %-d, %Y",
    "%d %B %Y",
    "%-d %B %Y",
    "%a %b %d %Y",
    "%a %b %-d %Y",
];

/// Date-time layouts without an offset. These are taken to be UTC.
const DATE_TIME_FORMATS: &[&str] = &["%FT%T", "%FT%R", "%F %T"];

/// A single event in the database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Event {
    /// The ID of the event.
    id: Uuid,

    /// The URL-safe identifier derived from the title. Unique.
    slug: String,

    /// The normalized fields.
    #[serde(flatten)]
    details: EventDetails,

    /// The times it was created and updated.
    #[serde(flatten)]
    times: Times,
}

impl Event {
    pub fn new(id: Uuid, slug: String, details: EventDetails, times: Times) -> Self {
        Event {
            id,
            slug,
            details,
            times,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    pub fn times(&self) -> &Times {
        &self.times
    }

    /// Whether this event has at least one tag in common with `other`.
    pub fn shares_tag_with(&self, other: &Event) -> bool {
        self.details
            .tags
            .iter()
            .any(|tag| other.details.tags.contains(tag))
    }
}

/// The descriptive fields of an event, all trimmed and in canonical
/// form.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub overview: String,
    /// Location of the event image. Uploading is handled elsewhere.
    pub image: String,
    pub venue: String,
    pub location: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:mm`, 24-hour clock.
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

/// An event that has passed validation and is ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    pub(crate) slug: String,
    pub(crate) details: EventDetails,
}

impl NewEvent {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn details(&self) -> &EventDetails {
        &self.details
    }
}

/// The fields of an event as submitted by a client. Anything may be
/// missing or untidy until [`EventSubmission::validate`] has run.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventSubmission {
    #[serde(default)]
    pub title: Option<String>,

    /// Accepted for compatibility but always replaced by one derived
    /// from the title.
    #[serde(default, skip_serializing)]
    pub slug: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_list")]
    pub agenda: Option<Vec<String>>,

    #[serde(default)]
    pub organizer: Option<String>,

    #[serde(default, deserialize_with = "normalization::deserialize_list")]
    pub tags: Option<Vec<String>>,
}

impl EventSubmission {
    /// Checks and normalizes the submission.
    ///
    /// `previous` is the stored version when updating. Its slug is kept
    /// unless the title changed; a new event always gets a fresh slug.
    pub fn validate(self, previous: Option<&Event>) -> Result<NewEvent, ValidationError> {
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let overview = required("overview", self.overview)?;
        let image = required("image", self.image)?;
        let venue = required("venue", self.venue)?;
        let location = required("location", self.location)?;
        let date = required("date", self.date)?;
        let time = required("time", self.time)?;
        let mode = required("mode", self.mode)?;
        let audience = required("audience", self.audience)?;
        let organizer = required("organizer", self.organizer)?;

        let date = normalize_date(&date)?;
        let time = normalize_time(&time)?;

        let slug = match previous {
            Some(previous) if previous.details.title == title && !previous.slug.is_empty() => {
                previous.slug.clone()
            }
            _ => normalization::slugify(&title),
        };

        if slug.is_empty() {
            return Err(ValidationError::EmptySlug);
        }

        let agenda = self
            .agenda
            .and_then(normalization::trim_entries)
            .ok_or(ValidationError::EmptyAgenda)?;
        let tags = self
            .tags
            .and_then(normalization::trim_entries)
            .ok_or(ValidationError::EmptyTags)?;

        Ok(NewEvent {
            slug,
            details: EventDetails {
                title,
                description,
                overview,
                image,
                venue,
                location,
                date,
                time,
                mode,
                audience,
                agenda,
                organizer,
                tags,
            },
        })
    }
}

impl From<EventDetails> for EventSubmission {
    fn from(details: EventDetails) -> Self {
        EventSubmission {
            title: Some(details.title),
            slug: None,
            description: Some(details.description),
            overview: Some(details.overview),
            image: Some(details.image),
            venue: Some(details.venue),
            location: Some(details.location),
            date: Some(details.date),
            time: Some(details.time),
            mode: Some(details.mode),
            audience: Some(details.audience),
            agenda: Some(details.agenda),
            organizer: Some(details.organizer),
            tags: Some(details.tags),
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(ValidationError::MissingField { field }),
    }
}

/// Parses a date in any of the accepted layouts and returns its UTC
/// calendar date as `YYYY-MM-DD`.
pub fn normalize_date(date: &str) -> Result<String, ValidationError> {
    parse_date(date)
        .map(|date| date.format("%F"))
        .ok_or_else(|| ValidationError::InvalidDate {
            date: date.to_owned(),
        })
}

fn parse_date(date: &str) -> Option<Date> {
    if let Ok(date_time) = OffsetDateTime::parse(date, Format::Rfc3339) {
        return Some(date_time.to_offset(UtcOffset::UTC).date());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(date, *format).ok())
        .map(|date_time| date_time.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| Date::parse(date, *format).ok())
        })
}

/// Checks a 24-hour `H:mm` or `HH:mm` time and returns it zero-padded.
pub fn normalize_time(time: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        time: time.to_owned(),
    };

    let captures = TIME_PATTERN.captures(time).ok_or_else(invalid)?;

    let hour: u32 = captures[1].parse().map_err(|_| invalid())?;
    let minute: u32 = captures[2].parse().map_err(|_| invalid())?;

    if hour > 23 {
        return Err(ValidationError::HourOutOfRange { hour });
    }

    if minute > 59 {
        return Err(ValidationError::MinuteOutOfRange { minute });
    }

    Ok(format!("{:02}:{:02}", hour, minute))
}
