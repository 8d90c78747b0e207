use serde::{Deserialize, Serialize};

use super::election::ElectionSummary;

/// Site-wide figures shown on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStats {
    pub total_votes: u64,
    /// Elections whose window contains the current instant.
    pub active_elections: u64,
    pub total_candidates: u64,
}

/// Figures shown at the top of the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_elections: u64,
    pub active_elections: u64,
    pub total_votes: u64,
    pub total_candidates: u64,
}

/// The admin dashboard: every election plus the headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    /// Newest first.
    pub elections: Vec<ElectionSummary>,
}
