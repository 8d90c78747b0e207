use chrono::Utc;
use rocket::{
    futures::future::{try_join, try_join3, try_join_all},
    serde::json::Json,
    Route,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            audit_log::{AuditLogDescription, MAX_LIMIT},
            auth::AdminToken,
            candidate::{CandidateDescription, CandidateSpec},
            election::{ElectionDescription, ElectionSpec, ElectionSummary},
            stats::{Dashboard, DashboardStats},
        },
        common::{
            audit::{ADMIN_USER, CANDIDATE_ADDED, ELECTION_CREATED},
            election::ElectionStatus,
        },
        db::{audit_log::NewAuditLogEntry, election::Election},
        mongodb::Id,
        store::Datastore,
    },
    realtime::Notifier,
};

use super::common::{election_by_id, record_audit};

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        add_candidate,
        delete_candidate,
        dashboard,
        audit_logs,
    ]
}

#[post("/admin/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AdminToken,
    spec: Json<ElectionSpec>,
    store: Datastore,
    notifier: Notifier,
) -> Result<Json<ElectionDescription>> {
    let now = Utc::now();
    let election = store.insert_election(spec.0.into_election(now)?).await?;

    let details = format!("Created election: {}", election.title);
    record_audit(
        &store,
        &notifier,
        NewAuditLogEntry::new(ELECTION_CREATED, ADMIN_USER, Some(details)),
    )
    .await;

    Ok(Json(ElectionDescription::new(election, now)))
}

#[post("/admin/elections/<election_id>/candidates", data = "<spec>", format = "json")]
async fn add_candidate(
    _token: AdminToken,
    election_id: Id,
    spec: Json<CandidateSpec>,
    store: Datastore,
    notifier: Notifier,
) -> Result<Json<CandidateDescription>> {
    // Validate before touching the store.
    let candidate = spec.0.into_candidate(election_id)?;
    election_by_id(&store, election_id).await?;
    let candidate = store.insert_candidate(candidate).await?;

    let details = format!("Added candidate: {}", candidate.name);
    record_audit(
        &store,
        &notifier,
        NewAuditLogEntry::new(CANDIDATE_ADDED, ADMIN_USER, Some(details)),
    )
    .await;

    Ok(Json(candidate.into()))
}

#[delete("/admin/candidates/<candidate_id>")]
async fn delete_candidate(_token: AdminToken, candidate_id: Id, store: Datastore) -> Result<()> {
    if store.delete_candidate(candidate_id).await? {
        Ok(())
    } else {
        Err(Error::not_found(format!("Candidate {candidate_id}")))
    }
}

async fn summarise(store: &Datastore, election: Election) -> Result<ElectionSummary> {
    let now = Utc::now();
    let (candidate_count, vote_count) = try_join(
        store.count_candidates(Some(election.id)),
        store.count_votes(Some(election.id)),
    )
    .await?;
    Ok(ElectionSummary {
        election: ElectionDescription::new(election, now),
        candidate_count,
        vote_count,
    })
}

#[get("/admin/dashboard")]
async fn dashboard(_token: AdminToken, store: Datastore) -> Result<Json<Dashboard>> {
    let (elections, total_votes, total_candidates) = try_join3(
        store.elections(),
        store.count_votes(None),
        store.count_candidates(None),
    )
    .await?;
    let elections = try_join_all(
        elections
            .into_iter()
            .map(|election| summarise(&store, election)),
    )
    .await?;

    let active_elections = elections
        .iter()
        .filter(|summary| summary.election.status == ElectionStatus::Active)
        .count() as u64;
    let stats = DashboardStats {
        total_elections: elections.len() as u64,
        active_elections,
        total_votes,
        total_candidates,
    };

    Ok(Json(Dashboard { stats, elections }))
}

#[get("/admin/logs")]
async fn audit_logs(_token: AdminToken, store: Datastore) -> Result<Json<Vec<AuditLogDescription>>> {
    let entries = store.audit_logs(MAX_LIMIT).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
