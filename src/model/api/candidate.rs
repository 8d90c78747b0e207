use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::{
        common::tally::{percentage, Tally, TallyEntry},
        db::{
            candidate::{Candidate, NewCandidate},
            vote::Vote,
        },
        mongodb::{serde_hex, Id},
    },
};

/// Shown when a candidate is submitted without a name.
pub const MISSING_CANDIDATE_NAME: &str = "Please enter a candidate name";

/// A candidate as submitted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl CandidateSpec {
    /// Validate this spec and attach it to an election. Blank optional fields
    /// are stored as absent.
    pub fn into_candidate(self, election_id: Id) -> Result<NewCandidate> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation(MISSING_CANDIDATE_NAME));
        }
        Ok(NewCandidate {
            election_id,
            name: name.to_string(),
            party: non_blank(self.party),
            bio: non_blank(self.bio),
        })
    }
}

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    #[serde(with = "serde_hex")]
    pub id: Id,
    #[serde(with = "serde_hex")]
    pub election_id: Id,
    pub name: String,
    pub party: Option<String>,
    pub bio: Option<String>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            election_id: candidate.candidate.election_id,
            name: candidate.candidate.name,
            party: candidate.candidate.party,
            bio: candidate.candidate.bio,
        }
    }
}

/// A candidate with its share of the vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub candidate: CandidateDescription,
    pub votes: u64,
    /// Rounded share of the election total; 0 when nobody has voted.
    pub percentage: u64,
}

/// Tallied candidates of one election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResults {
    pub candidates: Vec<CandidateResult>,
    pub total_votes: u64,
}

impl CandidateResults {
    /// Count `votes` against `candidates`, keeping the candidates' order.
    pub fn in_order(candidates: Vec<Candidate>, votes: &[Vote]) -> Self {
        Self::count(candidates, votes, false)
    }

    /// Count `votes` against `candidates`, most votes first.
    pub fn ranked(candidates: Vec<Candidate>, votes: &[Vote]) -> Self {
        Self::count(candidates, votes, true)
    }

    fn count(candidates: Vec<Candidate>, votes: &[Vote], ranked: bool) -> Self {
        let tally = Tally::count(
            candidates.iter().map(|c| c.id),
            votes.iter().map(|v| &v.candidate_id),
        );
        let total_votes = tally.total();
        let entries = if ranked {
            tally.ranked()
        } else {
            tally.into_entries()
        };

        let mut by_id: HashMap<Id, Candidate> =
            candidates.into_iter().map(|c| (c.id, c)).collect();
        let candidates = entries
            .into_iter()
            .filter_map(|TallyEntry { candidate, votes }| {
                let candidate = by_id.remove(&candidate)?;
                Some(CandidateResult {
                    candidate: candidate.into(),
                    votes,
                    percentage: percentage(votes, total_votes),
                })
            })
            .collect();

        Self {
            candidates,
            total_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::db::{candidate::CandidateCore, vote::VoteCore};

    use super::*;

    fn candidate(election_id: Id, name: &str) -> Candidate {
        Candidate {
            id: Id::new(),
            candidate: CandidateCore::example(election_id, name),
        }
    }

    fn votes_for(candidate: &Candidate, n: usize) -> Vec<Vote> {
        (0..n)
            .map(|i| Vote {
                id: Id::new(),
                vote: VoteCore::example(candidate.election_id, candidate.id, &format!("v{i}")),
            })
            .collect()
    }

    #[test]
    fn blank_fields() {
        let election_id = Id::new();
        let spec = CandidateSpec {
            name: "  Ada ".to_string(),
            party: Some(" ".to_string()),
            bio: Some("Engineer".to_string()),
        };
        let candidate = spec.into_candidate(election_id).unwrap();
        assert_eq!(candidate.name, "Ada");
        assert_eq!(candidate.party, None);
        assert_eq!(candidate.bio.as_deref(), Some("Engineer"));

        let spec = CandidateSpec {
            name: String::new(),
            party: None,
            bio: None,
        };
        let err = spec.into_candidate(election_id).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_CANDIDATE_NAME));
    }

    #[test]
    fn ranked_results() {
        let election_id = Id::new();
        let (a, b, c) = (
            candidate(election_id, "A"),
            candidate(election_id, "B"),
            candidate(election_id, "C"),
        );
        let mut votes = votes_for(&b, 1);
        votes.extend(votes_for(&a, 3));

        let results = CandidateResults::ranked(vec![c, a, b], &votes);
        assert_eq!(results.total_votes, 4);
        let summary: Vec<_> = results
            .candidates
            .iter()
            .map(|r| (r.candidate.name.as_str(), r.votes, r.percentage))
            .collect();
        assert_eq!(summary, vec![("A", 3, 75), ("B", 1, 25), ("C", 0, 0)]);
    }

    #[test]
    fn in_order_results_ignore_removed_candidates() {
        let election_id = Id::new();
        let (a, removed) = (candidate(election_id, "A"), candidate(election_id, "Gone"));
        let mut votes = votes_for(&a, 1);
        votes.extend(votes_for(&removed, 2));

        let results = CandidateResults::in_order(vec![a], &votes);
        assert_eq!(results.total_votes, 1);
        assert_eq!(results.candidates[0].percentage, 100);
    }
}
