use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The times a record was created and last updated.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Times {
    /// The date and time it was created.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) created_at: OffsetDateTime,

    /// The date and time it was last modified.
    #[serde(with = "time::serde::timestamp")]
    pub(crate) updated_at: OffsetDateTime,
}

impl Times {
    pub fn new(created_at: OffsetDateTime, updated_at: OffsetDateTime) -> Self {
        Times {
            created_at,
            updated_at,
        }
    }

    /// Both times set to the current instant.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();

        Times::new(now, now)
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// A copy with `updated_at` moved to the current instant.
    pub fn touched(&self) -> Self {
        Times::new(self.created_at, OffsetDateTime::now_utc())
    }
}
