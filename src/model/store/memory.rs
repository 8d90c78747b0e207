use rocket::{http::Status, tokio::sync::RwLock};

use crate::{
    error::{Error, Result},
    model::{
        db::{
            admin::{Admin, NewAdmin},
            audit_log::{AuditLogEntry, NewAuditLogEntry},
            candidate::{Candidate, NewCandidate},
            election::{Election, NewElection},
            vote::{NewVote, Vote},
        },
        mongodb::Id,
    },
};

use super::Store;

#[derive(Default)]
struct Tables {
    elections: Vec<Election>,
    candidates: Vec<Candidate>,
    votes: Vec<Vote>,
    audit_logs: Vec<AuditLogEntry>,
    admins: Vec<Admin>,
}

/// A [`Store`] kept entirely in memory. Rows live in insertion order and are
/// lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[rocket::async_trait]
impl Store for MemoryStore {
    async fn elections(&self) -> Result<Vec<Election>> {
        let tables = self.tables.read().await;
        Ok(tables.elections.iter().rev().cloned().collect())
    }

    async fn election(&self, id: Id) -> Result<Option<Election>> {
        let tables = self.tables.read().await;
        Ok(tables.elections.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_election(&self, election: NewElection) -> Result<Election> {
        let election = Election {
            id: Id::new(),
            election,
        };
        self.tables.write().await.elections.push(election.clone());
        Ok(election)
    }

    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>> {
        let tables = self.tables.read().await;
        Ok(tables
            .candidates
            .iter()
            .filter(|c| c.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        let tables = self.tables.read().await;
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let candidate = Candidate {
            id: Id::new(),
            candidate,
        };
        self.tables.write().await.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn delete_candidate(&self, id: Id) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.candidates.len();
        tables.candidates.retain(|c| c.id != id);
        Ok(tables.candidates.len() != before)
    }

    async fn count_candidates(&self, election_id: Option<Id>) -> Result<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .candidates
            .iter()
            .filter(|c| election_id.map_or(true, |id| c.election_id == id))
            .count();
        Ok(count as u64)
    }

    async fn votes(&self, election_id: Id) -> Result<Vec<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn vote_by_voter(&self, election_id: Id, voter_id: &str) -> Result<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .find(|v| v.election_id == election_id && v.voter_id == voter_id)
            .cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote> {
        // Check and insert under one lock, like a unique index would.
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .votes
            .iter()
            .any(|v| v.election_id == vote.election_id && v.voter_id == vote.voter_id);
        if duplicate {
            return Err(Error::AlreadyVoted);
        }
        let vote = Vote { id: Id::new(), vote };
        tables.votes.push(vote.clone());
        Ok(vote)
    }

    async fn count_votes(&self, election_id: Option<Id>) -> Result<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .votes
            .iter()
            .filter(|v| election_id.map_or(true, |id| v.election_id == id))
            .count();
        Ok(count as u64)
    }

    async fn insert_audit_log(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: Id::new(),
            entry,
        };
        self.tables.write().await.audit_logs.push(entry.clone());
        Ok(entry)
    }

    async fn audit_logs(&self, limit: u32) -> Result<Vec<AuditLogEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .audit_logs
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn admin(&self, username: &str) -> Result<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn admin_by_id(&self, id: Id) -> Result<Option<Admin>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin> {
        let mut tables = self.tables.write().await;
        if tables.admins.iter().any(|a| a.username == admin.username) {
            return Err(Error::Status(
                Status::BadRequest,
                format!("Admin username already in use: {}", admin.username),
            ));
        }
        let admin = Admin { id: Id::new(), admin };
        tables.admins.push(admin.clone());
        Ok(admin)
    }
}
