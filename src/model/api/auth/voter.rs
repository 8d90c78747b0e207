use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Private cookie holding the connected voter's ID.
pub const VOTER_COOKIE: &str = "voter_id";

/// Shown when a voter tries to connect with a blank ID.
pub const MISSING_VOTER_ID: &str = "Please enter a voter ID";

/// The voter connected in this browser.
///
/// The ID is self-asserted: nothing proves the requester owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSession {
    pub voter_id: String,
}

impl VoterSession {
    /// A cookie remembering this voter for the configured time. Must be added
    /// as a private cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        Cookie::build(VOTER_COOKIE, self.voter_id)
            .max_age(Duration::seconds(config.voter_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterSession {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.cookies().get_private(VOTER_COOKIE) {
            Some(cookie) => Outcome::Success(Self {
                voter_id: cookie.value().to_string(),
            }),
            None => {
                let err = Error::Status(
                    Status::Unauthorized,
                    "Please connect your voter ID first".to_string(),
                );
                Outcome::Failure((Status::Unauthorized, err))
            }
        }
    }
}

/// A request to connect as a voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterConnect {
    pub voter_id: String,
}

impl VoterConnect {
    pub fn into_session(self) -> Result<VoterSession> {
        let voter_id = self.voter_id.trim();
        if voter_id.is_empty() {
            return Err(Error::validation(MISSING_VOTER_ID));
        }
        Ok(VoterSession {
            voter_id: voter_id.to_string(),
        })
    }
}
