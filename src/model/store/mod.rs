//! The datastore seam.
//!
//! All persistence goes through the [`Store`] trait. Production uses
//! [`MongoStore`]; [`MemoryStore`] keeps everything in-process for demos and
//! tests. Both enforce the same integrity rules: unique admin usernames and at
//! most one vote per `(election_id, voter_id)`.

mod memory;
mod mongo;

use std::{ops::Deref, sync::Arc};

use rocket::{
    outcome::try_outcome,
    request::{self, FromRequest, Request},
    State,
};

use crate::{
    error::Result,
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

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Row-level access to the election tables.
#[rocket::async_trait]
pub trait Store: Send + Sync {
    /// All elections, newest first.
    async fn elections(&self) -> Result<Vec<Election>>;

    async fn election(&self, id: Id) -> Result<Option<Election>>;

    async fn insert_election(&self, election: NewElection) -> Result<Election>;

    /// Candidates of one election, in the order they were added.
    async fn candidates(&self, election_id: Id) -> Result<Vec<Candidate>>;

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>>;

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    /// Returns whether a candidate was actually deleted.
    async fn delete_candidate(&self, id: Id) -> Result<bool>;

    /// Number of candidates, in one election or overall.
    async fn count_candidates(&self, election_id: Option<Id>) -> Result<u64>;

    /// Votes of one election, in the order they were cast.
    async fn votes(&self, election_id: Id) -> Result<Vec<Vote>>;

    /// The vote a given voter cast in a given election, if any.
    async fn vote_by_voter(&self, election_id: Id, voter_id: &str) -> Result<Option<Vote>>;

    /// Insert a vote. Fails with [`crate::error::Error::AlreadyVoted`] if the
    /// voter already has a vote in this election; no row is written then.
    async fn insert_vote(&self, vote: NewVote) -> Result<Vote>;

    /// Number of votes, in one election or overall.
    async fn count_votes(&self, election_id: Option<Id>) -> Result<u64>;

    async fn insert_audit_log(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry>;

    /// The newest `limit` audit entries, newest first.
    async fn audit_logs(&self, limit: u32) -> Result<Vec<AuditLogEntry>>;

    async fn admin(&self, username: &str) -> Result<Option<Admin>>;

    async fn admin_by_id(&self, id: Id) -> Result<Option<Admin>>;

    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin>;
}

/// A shared handle on whichever [`Store`] the server was configured with.
/// Lives in managed state and can be requested directly by any handler.
#[derive(Clone)]
pub struct Datastore(Arc<dyn Store>);

impl Datastore {
    pub fn new(store: impl Store + 'static) -> Self {
        Self(Arc::new(store))
    }

    /// A fresh, empty in-process store.
    pub fn memory() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl Deref for Datastore {
    type Target = dyn Store;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Datastore {
    type Error = ();

    /// Get the datastore from the managed state.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = try_outcome!(req.guard::<&State<Datastore>>().await);
        request::Outcome::Success(store.inner().clone())
    }
}
