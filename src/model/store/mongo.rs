use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
    Database,
};
use rocket::{futures::TryStreamExt, http::Status};

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
        mongodb::{ensure_indexes_exist, is_duplicate_key_error, Coll, Id},
    },
};

use super::Store;

/// A [`Store`] backed by a MongoDB database.
pub struct MongoStore {
    elections: Coll<Election>,
    new_elections: Coll<NewElection>,
    candidates: Coll<Candidate>,
    new_candidates: Coll<NewCandidate>,
    votes: Coll<Vote>,
    new_votes: Coll<NewVote>,
    audit_logs: Coll<AuditLogEntry>,
    new_audit_logs: Coll<NewAuditLogEntry>,
    admins: Coll<Admin>,
    new_admins: Coll<NewAdmin>,
}

impl MongoStore {
    /// Open a store on the given database, creating indexes as needed.
    pub async fn connect(db: &Database) -> Result<Self> {
        ensure_indexes_exist(db).await?;
        Ok(Self {
            elections: Coll::from_db(db),
            new_elections: Coll::from_db(db),
            candidates: Coll::from_db(db),
            new_candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
            new_votes: Coll::from_db(db),
            audit_logs: Coll::from_db(db),
            new_audit_logs: Coll::from_db(db),
            admins: Coll::from_db(db),
            new_admins: Coll::from_db(db),
        })
    }
}

/// Extract the ID the database assigned to a freshly inserted document.
fn inserted_id(result: mongodb::results::InsertOneResult) -> Result<Id> {
    result
        .inserted_id
        .as_object_id()
        .map(Id::from)
        .ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                "Database returned a non-ObjectId primary key".to_string(),
            )
        })
}

fn newest_first() -> Document {
    doc! { "created_at": -1, "_id": -1 }
}

fn oldest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

fn scoped(election_id: Option<Id>) -> Document {
    election_id.map_or_else(Document::new, |id| doc! { "election_id": id })
}

#[rocket::async_trait]
impl Store for MongoStore {
    async fn elections(&self) -> Result<Vec<Election>> {
        let options = FindOptions::builder().sort(newest_first()).build();
        Ok(self
            .elections
            .find(None, options)
            .await?
            .try_collect()
            .await?)
    }

    async fn election(&self, id: Id) -> Result<Option<Election>> {
        Ok(self.elections.find_one(id.as_doc(), None).await?)
    }

    async fn insert_election(&self, election: NewElection) -> Result<Election> {
        let result = self.new_elections.insert_one(&election, None).await?;
        Ok(Election {
            id: inserted_id(result)?,
            election,
        })
    }

    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>> {
        Ok(self
            .candidates
            .find(doc! { "election_id": election_id }, oldest_first())
            .await?
            .try_collect()
            .await?)
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.candidates.find_one(id.as_doc(), None).await?)
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let result = self.new_candidates.insert_one(&candidate, None).await?;
        Ok(Candidate {
            id: inserted_id(result)?,
            candidate,
        })
    }

    async fn delete_candidate(&self, id: Id) -> Result<bool> {
        let result = self.candidates.delete_one(id.as_doc(), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_candidates(&self, election_id: Option<Id>) -> Result<u64> {
        Ok(self
            .candidates
            .count_documents(scoped(election_id), None)
            .await?)
    }

    async fn votes(&self, election_id: Id) -> Result<Vec<Vote>> {
        Ok(self
            .votes
            .find(doc! { "election_id": election_id }, oldest_first())
            .await?
            .try_collect()
            .await?)
    }

    async fn vote_by_voter(&self, election_id: Id, voter_id: &str) -> Result<Option<Vote>> {
        let filter = doc! {
            "election_id": election_id,
            "voter_id": voter_id,
        };
        Ok(self.votes.find_one(filter, None).await?)
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote> {
        let result = match self.new_votes.insert_one(&vote, None).await {
            Ok(result) => result,
            Err(err) if is_duplicate_key_error(&err) => return Err(Error::AlreadyVoted),
            Err(err) => return Err(err.into()),
        };
        Ok(Vote {
            id: inserted_id(result)?,
            vote,
        })
    }

    async fn count_votes(&self, election_id: Option<Id>) -> Result<u64> {
        Ok(self.votes.count_documents(scoped(election_id), None).await?)
    }

    async fn insert_audit_log(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry> {
        let result = self.new_audit_logs.insert_one(&entry, None).await?;
        Ok(AuditLogEntry {
            id: inserted_id(result)?,
            entry,
        })
    }

    async fn audit_logs(&self, limit: u32) -> Result<Vec<AuditLogEntry>> {
        // MongoDB reads a limit of 0 as unlimited.
        if limit == 0 {
            return Ok(Vec::new());
        }
        let options = FindOptions::builder()
            .sort(newest_first())
            .limit(i64::from(limit))
            .build();
        Ok(self
            .audit_logs
            .find(None, options)
            .await?
            .try_collect()
            .await?)
    }

    async fn admin(&self, username: &str) -> Result<Option<Admin>> {
        Ok(self
            .admins
            .find_one(doc! { "username": username }, None)
            .await?)
    }

    async fn admin_by_id(&self, id: Id) -> Result<Option<Admin>> {
        Ok(self.admins.find_one(id.as_doc(), None).await?)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin> {
        let result = match self.new_admins.insert_one(&admin, None).await {
            Ok(result) => result,
            Err(err) if is_duplicate_key_error(&err) => {
                return Err(Error::Status(
                    Status::BadRequest,
                    format!("Admin username already in use: {}", admin.username),
                ))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Admin {
            id: inserted_id(result)?,
            admin,
        })
    }
}
