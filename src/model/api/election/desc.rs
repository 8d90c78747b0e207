use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::candidate::{CandidateResult, CandidateResults},
    common::election::ElectionStatus,
    db::election::Election,
    mongodb::{serde_hex, Id},
};

/// An API-friendly election description, with its status derived at a given
/// instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    /// Election unique ID.
    #[serde(with = "serde_hex")]
    pub id: Id,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Status derived from the voting window.
    pub status: ElectionStatus,
    pub created_at: DateTime<Utc>,
}

impl ElectionDescription {
    pub fn new(election: Election, now: DateTime<Utc>) -> Self {
        let status = election.status_at(now);
        Self {
            id: election.id,
            title: election.election.title,
            description: election.election.description,
            start_time: election.election.start_time,
            end_time: election.election.end_time,
            status,
            created_at: election.election.created_at,
        }
    }
}

/// An election with its candidates and their vote counts, as listed publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionOverview {
    #[serde(flatten)]
    pub election: ElectionDescription,
    /// Candidates in the order they were added.
    pub candidates: Vec<CandidateResult>,
    pub total_votes: u64,
}

impl ElectionOverview {
    pub fn new(election: ElectionDescription, results: CandidateResults) -> Self {
        Self {
            election,
            candidates: results.candidates,
            total_votes: results.total_votes,
        }
    }
}

/// A single election as seen by the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDetails {
    #[serde(flatten)]
    pub overview: ElectionOverview,
    /// Whether the connected voter has already voted here. Always false
    /// without a voter session.
    pub has_voted: bool,
}

/// An election line on the admin dashboard. Counts only, no tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    #[serde(flatten)]
    pub election: ElectionDescription,
    pub candidate_count: u64,
    pub vote_count: u64,
}
