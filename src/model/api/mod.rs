//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//! - Election status is always derived from the voting window, never read
//!   back from storage.

pub mod admin;
pub mod audit_log;
pub mod auth;
pub mod candidate;
pub mod chat;
pub mod election;
pub mod receipt;
pub mod stats;
