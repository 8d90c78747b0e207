use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::election::ElectionStatus, mongodb::Id};

/// Core election data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election title.
    pub title: String,
    /// Free-text description; may be empty.
    pub description: String,
    /// Voting opens.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Voting closes.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Status label written at creation. Never consulted afterwards; see
    /// [`ElectionCore::status_at`].
    pub status: ElectionStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ElectionCore {
    /// Create a new election, labelled as upcoming.
    pub fn new(
        title: String,
        description: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title,
            description,
            start_time,
            end_time,
            status: ElectionStatus::Upcoming,
            created_at,
        }
    }

    /// The effective status at `now`, derived from the voting window.
    pub fn status_at(&self, now: DateTime<Utc>) -> ElectionStatus {
        ElectionStatus::derive(now, self.start_time, self.end_time)
    }

    /// Case-insensitive match of `query` against the title or description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// An election without an ID, ready for insertion.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}
