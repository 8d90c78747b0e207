use std::fmt;

use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// Phases of the election lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Voting has not opened yet.
    Upcoming,
    /// Voting is open.
    Active,
    /// Voting has closed; results are final.
    Completed,
}

impl ElectionStatus {
    /// The effective status of an election at `now`, given its voting window.
    ///
    /// The start is inclusive and so is the end: an election is active for
    /// every instant `start <= now <= end`. Any stored status label is
    /// irrelevant here.
    pub fn derive(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if now < start {
            Self::Upcoming
        } else if now > end {
            Self::Completed
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        Bson::String(status.as_str().to_string())
    }
}
