use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core audit log data, as stored in the database. Entries are append-only.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AuditLogCore {
    /// What happened, e.g. "Vote Cast".
    pub action: String,
    /// Who did it: "Admin" or a voter ID.
    pub user: String,
    pub details: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl AuditLogCore {
    /// A new entry timestamped now.
    pub fn new(action: impl Into<String>, user: impl Into<String>, details: Option<String>) -> Self {
        Self {
            action: action.into(),
            user: user.into(),
            details,
            created_at: Utc::now(),
        }
    }
}

/// An audit log entry without an ID, ready for insertion.
pub type NewAuditLogEntry = AuditLogCore;

/// An audit log entry from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub entry: AuditLogCore,
}

impl Deref for AuditLogEntry {
    type Target = AuditLogCore;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}
