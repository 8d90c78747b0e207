use chrono::Utc;
use rocket::{
    futures::future::{try_join3, try_join_all},
    serde::json::Json,
    FromFormField, Route,
};

use crate::{
    error::Result,
    model::{
        api::{
            audit_log::{clamp_limit, AuditLogDescription},
            auth::VoterSession,
            election::{ElectionDetails, ElectionOverview, ElectionResults},
            stats::PublicStats,
        },
        common::election::ElectionStatus,
        mongodb::Id,
        store::Datastore,
    },
};

use super::common::{election_by_id, election_overview, election_results};

pub fn routes() -> Vec<Route> {
    routes![
        get_elections,
        get_election,
        get_results,
        get_stats,
        get_audit_logs,
    ]
}

/// Which elections to list, by derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromFormField)]
pub enum StatusFilter {
    All,
    Upcoming,
    Active,
    Completed,
}

impl StatusFilter {
    fn admits(self, status: ElectionStatus) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => status == ElectionStatus::Upcoming,
            Self::Active => status == ElectionStatus::Active,
            Self::Completed => status == ElectionStatus::Completed,
        }
    }
}

#[get("/elections?<status>&<search>")]
async fn get_elections(
    status: Option<StatusFilter>,
    search: Option<&str>,
    store: Datastore,
) -> Result<Json<Vec<ElectionOverview>>> {
    let now = Utc::now();
    let status = status.unwrap_or(StatusFilter::All);
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    // Filter before fetching candidates and votes.
    let elections = store.elections().await?.into_iter().filter(|election| {
        status.admits(election.status_at(now))
            && search.map_or(true, |query| election.matches(query))
    });

    let overviews = try_join_all(
        elections.map(|election| election_overview(&store, election, now)),
    )
    .await?;
    Ok(Json(overviews))
}

#[get("/elections/<election_id>")]
async fn get_election(
    election_id: Id,
    voter: Option<VoterSession>,
    store: Datastore,
) -> Result<Json<ElectionDetails>> {
    let now = Utc::now();
    let election = election_by_id(&store, election_id).await?;
    let has_voted = match voter {
        Some(voter) => store
            .vote_by_voter(election_id, &voter.voter_id)
            .await?
            .is_some(),
        None => false,
    };
    let overview = election_overview(&store, election, now).await?;
    Ok(Json(ElectionDetails {
        overview,
        has_voted,
    }))
}

#[get("/results")]
async fn get_results(store: Datastore) -> Result<Json<Vec<ElectionResults>>> {
    let now = Utc::now();
    let elections = store.elections().await?;
    let results = try_join_all(
        elections
            .into_iter()
            .map(|election| election_results(&store, election, now)),
    )
    .await?;
    Ok(Json(results))
}

#[get("/stats")]
async fn get_stats(store: Datastore) -> Result<Json<PublicStats>> {
    let now = Utc::now();
    let (elections, total_votes, total_candidates) = try_join3(
        store.elections(),
        store.count_votes(None),
        store.count_candidates(None),
    )
    .await?;
    let active_elections = elections
        .iter()
        .filter(|election| election.status_at(now) == ElectionStatus::Active)
        .count() as u64;
    Ok(Json(PublicStats {
        total_votes,
        active_elections,
        total_candidates,
    }))
}

#[get("/audit-logs?<limit>")]
async fn get_audit_logs(
    limit: Option<u32>,
    store: Datastore,
) -> Result<Json<Vec<AuditLogDescription>>> {
    let entries = store.audit_logs(clamp_limit(limit)).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::model::{
        common::audit::display_hash,
        db::{
            audit_log::NewAuditLogEntry, candidate::CandidateCore, election::ElectionCore,
            vote::VoteCore,
        },
    };

    use super::*;

    #[test]
    fn status_filter() {
        assert!(StatusFilter::All.admits(ElectionStatus::Completed));
        assert!(StatusFilter::Active.admits(ElectionStatus::Active));
        assert!(!StatusFilter::Active.admits(ElectionStatus::Upcoming));
    }

    #[backend_test]
    async fn list_and_filter(client: Client, store: Datastore) {
        let current = store
            .insert_election(ElectionCore::current_example())
            .await
            .unwrap();
        let future = store
            .insert_election(ElectionCore::future_example())
            .await
            .unwrap();
        let past = store
            .insert_election(ElectionCore::past_example())
            .await
            .unwrap();
        let ada = store
            .insert_candidate(CandidateCore::example(current.id, "Ada"))
            .await
            .unwrap();
        store
            .insert_vote(VoteCore::example(current.id, ada.id, "v1"))
            .await
            .unwrap();

        let all: Vec<ElectionOverview> = client
            .get("/elections")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        let ids: Vec<_> = all.iter().map(|e| e.election.id).collect();
        assert_eq!(ids, vec![past.id, future.id, current.id]);
        assert_eq!(all[2].total_votes, 1);
        assert_eq!(all[2].candidates[0].votes, 1);

        let active: Vec<ElectionOverview> = client
            .get("/elections?status=active")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].election.id, current.id);

        let searched: Vec<ElectionOverview> = client
            .get("/elections?search=RIVERSIDE")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].election.id, past.id);

        let none: Vec<ElectionOverview> = client
            .get("/elections?status=upcoming&search=council")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[backend_test(voter)]
    async fn details_with_has_voted(client: Client, store: Datastore) {
        let election = store
            .insert_election(ElectionCore::current_example())
            .await
            .unwrap();
        let ada = store
            .insert_candidate(CandidateCore::example(election.id, "Ada"))
            .await
            .unwrap();
        store
            .insert_candidate(CandidateCore::example(election.id, "Bob"))
            .await
            .unwrap();

        let details: ElectionDetails = client
            .get(uri!(get_election(election.id)))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(!details.has_voted);
        assert_eq!(details.overview.candidates.len(), 2);
        assert_eq!(details.overview.candidates[0].percentage, 0);

        store
            .insert_vote(VoteCore::example(election.id, ada.id, "test-voter"))
            .await
            .unwrap();
        let details: ElectionDetails = client
            .get(uri!(get_election(election.id)))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(details.has_voted);
        assert_eq!(details.overview.total_votes, 1);
        assert_eq!(details.overview.candidates[0].percentage, 100);

        let response = client.get(uri!(get_election(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn results_are_ranked(client: Client, store: Datastore) {
        let election = store
            .insert_election(ElectionCore::past_example())
            .await
            .unwrap();
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            let candidate = store
                .insert_candidate(CandidateCore::example(election.id, name))
                .await
                .unwrap();
            ids.push(candidate.id);
        }
        store
            .insert_vote(VoteCore::example(election.id, ids[1], "v0"))
            .await
            .unwrap();
        for voter in ["v1", "v2", "v3"] {
            store
                .insert_vote(VoteCore::example(election.id, ids[2], voter))
                .await
                .unwrap();
        }

        let results: Vec<ElectionResults> = client
            .get(uri!(get_results))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        let ranked: Vec<_> = results[0]
            .results
            .iter()
            .map(|r| (r.candidate.name.as_str(), r.votes, r.percentage))
            .collect();
        assert_eq!(ranked, vec![("C", 3, 75), ("B", 1, 25), ("A", 0, 0)]);
        assert_eq!(results[0].total_votes, 4);
    }

    #[backend_test]
    async fn site_stats(client: Client, store: Datastore) {
        let current = store
            .insert_election(ElectionCore::current_example())
            .await
            .unwrap();
        store
            .insert_election(ElectionCore::future_example())
            .await
            .unwrap();
        let ada = store
            .insert_candidate(CandidateCore::example(current.id, "Ada"))
            .await
            .unwrap();
        store
            .insert_vote(VoteCore::example(current.id, ada.id, "v1"))
            .await
            .unwrap();

        let stats: PublicStats = client
            .get(uri!(get_stats))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(
            stats,
            PublicStats {
                total_votes: 1,
                active_elections: 1,
                total_candidates: 1,
            }
        );
    }

    #[backend_test]
    async fn public_audit_feed(client: Client, store: Datastore) {
        for i in 0..8 {
            store
                .insert_audit_log(NewAuditLogEntry::new("Test", "Admin", Some(i.to_string())))
                .await
                .unwrap();
        }

        let logs: Vec<AuditLogDescription> = client
            .get("/audit-logs")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(logs.len(), 5);
        assert_eq!(logs[0].details.as_deref(), Some("7"));
        assert_eq!(logs[0].hash, display_hash(&logs[0].id.to_string()));

        let logs: Vec<AuditLogDescription> = client
            .get("/audit-logs?limit=2")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);

        let logs: Vec<AuditLogDescription> = client
            .get("/audit-logs?limit=0")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].details.as_deref(), Some("7"));
    }
}
