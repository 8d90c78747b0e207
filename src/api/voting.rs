use chrono::Utc;
use rocket::{http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::VoterSession,
            receipt::{Receipt, VoteSpec},
        },
        common::{audit::VOTE_CAST, election::ElectionStatus, vote::TransactionHash},
        db::{audit_log::NewAuditLogEntry, vote::NewVote},
        mongodb::Id,
        store::Datastore,
    },
    realtime::{ChangeKind, Notifier, Topic},
};

use super::common::{election_by_id, record_audit};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/elections/<election_id>/votes", data = "<ballot>", format = "json")]
async fn cast_vote(
    voter: VoterSession,
    election_id: Id,
    ballot: Json<VoteSpec>,
    store: Datastore,
    notifier: Notifier,
) -> Result<Json<Receipt>> {
    let now = Utc::now();

    // Check the election is open.
    let election = election_by_id(&store, election_id).await?;
    if election.status_at(now) != ElectionStatus::Active {
        return Err(Error::Status(
            Status::BadRequest,
            format!("Election '{}' is not accepting votes", election.title),
        ));
    }

    // Check the candidate stands in this election.
    let candidate_id = ballot.candidate_id;
    let candidate = store
        .candidate(candidate_id)
        .await?
        .filter(|candidate| candidate.election_id == election_id)
        .ok_or_else(|| {
            Error::not_found(format!("Candidate {candidate_id} in election {election_id}"))
        })?;

    // Advisory check; the store's uniqueness constraint has the final say.
    if store
        .vote_by_voter(election_id, &voter.voter_id)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyVoted);
    }

    let vote = NewVote {
        election_id,
        candidate_id: candidate.id,
        voter_id: voter.voter_id.clone(),
        transaction_hash: TransactionHash::random(&mut rand::thread_rng()),
        created_at: now,
    };
    let vote = store.insert_vote(vote).await?;
    notifier.publish(Topic::Votes, ChangeKind::Insert);
    info!("Vote cast in election {election_id}");

    let details = format!("Voted in: {}", election.title);
    record_audit(
        &store,
        &notifier,
        NewAuditLogEntry::new(VOTE_CAST, voter.voter_id, Some(details)),
    )
    .await;

    Ok(Json(vote.into()))
}
