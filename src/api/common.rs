use chrono::{DateTime, Utc};
use rocket::futures::future::try_join;

use crate::{
    error::{Error, Result},
    model::{
        api::{
            candidate::CandidateResults,
            election::{ElectionDescription, ElectionOverview, ElectionResults},
        },
        db::{
            audit_log::NewAuditLogEntry, candidate::Candidate, election::Election, vote::Vote,
        },
        mongodb::Id,
        store::Datastore,
    },
    realtime::{ChangeKind, Notifier, Topic},
};

/// Fetch an election, or fail with 404.
pub async fn election_by_id(store: &Datastore, election_id: Id) -> Result<Election> {
    store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))
}

/// Fetch an election's candidates and votes together.
async fn candidates_and_votes(
    store: &Datastore,
    election_id: Id,
) -> Result<(Vec<Candidate>, Vec<Vote>)> {
    try_join(store.candidates(election_id), store.votes(election_id)).await
}

/// An election with its candidates tallied in the order they were added.
pub async fn election_overview(
    store: &Datastore,
    election: Election,
    now: DateTime<Utc>,
) -> Result<ElectionOverview> {
    let (candidates, votes) = candidates_and_votes(store, election.id).await?;
    let results = CandidateResults::in_order(candidates, &votes);
    Ok(ElectionOverview::new(
        ElectionDescription::new(election, now),
        results,
    ))
}

/// An election with its candidates ranked by votes.
pub async fn election_results(
    store: &Datastore,
    election: Election,
    now: DateTime<Utc>,
) -> Result<ElectionResults> {
    let (candidates, votes) = candidates_and_votes(store, election.id).await?;
    let ranked = CandidateResults::ranked(candidates, &votes);
    Ok(ElectionResults::new(
        ElectionDescription::new(election, now),
        ranked,
    ))
}

/// Append an audit entry and notify audit log watchers.
///
/// The action being audited has already happened, so a failure here is
/// logged rather than returned.
pub async fn record_audit(store: &Datastore, notifier: &Notifier, entry: NewAuditLogEntry) {
    let action = entry.action.clone();
    match store.insert_audit_log(entry).await {
        Ok(_) => {
            notifier.publish(Topic::AuditLogs, ChangeKind::Insert);
        }
        Err(e) => error!("Failed to record audit entry '{action}': {e}"),
    }
}
