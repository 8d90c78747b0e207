use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::audit::display_hash,
    db::audit_log::AuditLogEntry,
    mongodb::{serde_hex, Id},
};

/// Entries shown on the public activity feed unless asked otherwise.
pub const DEFAULT_PUBLIC_LIMIT: u32 = 5;
/// Most entries any single request may fetch.
pub const MAX_LIMIT: u32 = 100;

/// An audit log entry with its display fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogDescription {
    #[serde(with = "serde_hex")]
    pub id: Id,
    pub action: String,
    pub user: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Display hash of the entry ID.
    pub hash: String,
}

impl From<AuditLogEntry> for AuditLogDescription {
    fn from(entry: AuditLogEntry) -> Self {
        let hash = display_hash(&entry.id.to_string());
        Self {
            id: entry.id,
            action: entry.entry.action,
            user: entry.entry.user,
            details: entry.entry.details,
            created_at: entry.entry.created_at,
            hash,
        }
    }
}

/// Clamp a requested page size to `1..=MAX_LIMIT`.
pub fn clamp_limit(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_PUBLIC_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use crate::model::db::audit_log::AuditLogCore;

    use super::*;

    #[test]
    fn limits() {
        assert_eq!(clamp_limit(None), 5);
        assert_eq!(clamp_limit(Some(20)), 20);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), 100);
    }

    #[test]
    fn hash_follows_id() {
        let entry = AuditLogEntry {
            id: "64b7f0c2a1b2c3d4e5f60718".parse().unwrap(),
            entry: AuditLogCore::new("Vote Cast", "voter-1", None),
        };
        let desc = AuditLogDescription::from(entry);
        assert_eq!(desc.hash, display_hash("64b7f0c2a1b2c3d4e5f60718"));
        assert!(desc.hash.starts_with("0x"));
    }
}
