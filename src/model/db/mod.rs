//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.
//!
//! Each row type comes as a `*Core` (no ID, used for insertion) plus a
//! wrapper carrying the ID assigned by the store.

pub mod admin;
pub mod audit_log;
pub mod candidate;
pub mod election;
pub mod vote;
