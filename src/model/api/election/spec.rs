use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::db::election::NewElection,
};

/// Shown when the election form is missing a title.
pub const MISSING_ELECTION_FIELDS: &str = "Please fill in all required fields";

/// An election as submitted by an admin.
///
/// Both times are required; a spec without them fails to deserialise. An end
/// before the start is accepted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ElectionSpec {
    /// Validate this spec and turn it into a storable election created at
    /// `now`.
    pub fn into_election(self, now: DateTime<Utc>) -> Result<NewElection> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::validation(MISSING_ELECTION_FIELDS));
        }
        Ok(NewElection::new(
            title.to_string(),
            self.description.trim().to_string(),
            self.start_time,
            self.end_time,
            now,
        ))
    }
}

#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionSpec {
        pub fn current_example() -> Self {
            let now = Utc::now();
            Self {
                title: "Student Union President".to_string(),
                description: "Annual election.".to_string(),
                start_time: now - Duration::hours(1),
                end_time: now + Duration::days(2),
            }
        }

        pub fn future_example() -> Self {
            let now = Utc::now();
            Self {
                title: "Treasurer".to_string(),
                description: String::new(),
                start_time: now + Duration::days(3),
                end_time: now + Duration::days(4),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::common::election::ElectionStatus;

    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let mut spec = ElectionSpec::current_example();
        spec.title = "   ".to_string();
        let err = spec.into_election(Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_ELECTION_FIELDS));
    }

    #[test]
    fn stored_as_upcoming() {
        let now = Utc::now();
        let election = ElectionSpec::current_example().into_election(now).unwrap();
        assert_eq!(election.status, ElectionStatus::Upcoming);
        assert_eq!(election.status_at(now), ElectionStatus::Active);
        assert_eq!(election.created_at, now);
        assert_eq!(election.title, "Student Union President");
    }

    #[test]
    fn inverted_window_is_accepted() {
        let mut spec = ElectionSpec::future_example();
        std::mem::swap(&mut spec.start_time, &mut spec.end_time);
        assert!(spec.into_election(Utc::now()).is_ok());
    }
}
