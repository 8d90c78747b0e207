use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::vote::TransactionHash,
    db::vote::Vote,
    mongodb::{serde_hex, Id},
};

/// A ballot as submitted by a connected voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteSpec {
    #[serde(with = "serde_hex")]
    pub candidate_id: Id,
}

/// What the voter gets back after casting a vote.
///
/// The transaction hash is cosmetic: nothing can be verified with it.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(with = "serde_hex")]
    pub election_id: Id,
    #[serde(with = "serde_hex")]
    pub candidate_id: Id,
    pub transaction_hash: TransactionHash,
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for Receipt {
    fn from(vote: Vote) -> Self {
        Self {
            election_id: vote.vote.election_id,
            candidate_id: vote.vote.candidate_id,
            transaction_hash: vote.vote.transaction_hash,
            created_at: vote.vote.created_at,
        }
    }
}
