//! Types and logic shared between the DB and API representations.

pub mod audit;
pub mod election;
pub mod tally;
pub mod vote;
