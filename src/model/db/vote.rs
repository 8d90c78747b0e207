use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::vote::TransactionHash, mongodb::Id};

/// Core vote data, as stored in the database.
///
/// At most one vote exists per `(election_id, voter_id)`; the store enforces
/// this with a unique index.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct VoteCore {
    pub election_id: Id,
    pub candidate_id: Id,
    /// Self-asserted voter identity.
    pub voter_id: String,
    pub transaction_hash: TransactionHash,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A vote without an ID, ready for insertion.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}
