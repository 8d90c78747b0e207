use serde::{Deserialize, Serialize};

use crate::model::api::candidate::{CandidateResult, CandidateResults};

use super::ElectionDescription;

/// An election with its candidates ranked by votes received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    #[serde(flatten)]
    pub election: ElectionDescription,
    /// Most votes first; ties keep the order candidates were added in.
    pub results: Vec<CandidateResult>,
    pub total_votes: u64,
}

impl ElectionResults {
    pub fn new(election: ElectionDescription, ranked: CandidateResults) -> Self {
        Self {
            election,
            results: ranked.candidates,
            total_votes: ranked.total_votes,
        }
    }
}
