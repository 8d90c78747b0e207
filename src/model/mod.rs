//! Data types, from the wire to the datastore.
//!
//! - [`api`]: request and response bodies.
//! - [`common`]: pure domain logic shared by both sides.
//! - [`db`]: rows as stored.
//! - [`mongodb`]: MongoDB glue.
//! - [`store`]: the datastore abstraction and its implementations.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
pub mod store;
