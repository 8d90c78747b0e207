use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::IntoOutcome,
    request::{FromRequest, Outcome},
    time::Duration,
    Request,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        db::admin::Admin,
        mongodb::{serde_hex, Id},
        store::Datastore,
    },
};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Proof that the requester is a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminToken {
    #[serde(with = "serde_hex")]
    pub id: Id,
    #[serde(rename = "usr")]
    pub username: String,
}

impl AdminToken {
    pub fn new(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
        }
    }

    /// Sign this token into a cookie that expires after the configured TTL.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Verify and decode a token from a cookie. Expired or tampered tokens are
    /// rejected.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AdminToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

fn unauthorized() -> Error {
    Error::Status(Status::Unauthorized, "Admin login required".to_string())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Error;

    /// Get an [`AdminToken`] from the cookie and check that the admin it names
    /// still exists.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (Some(config), Some(store)) = (
            req.rocket().state::<Config>(),
            req.rocket().state::<Datastore>(),
        ) else {
            let err = Error::Status(
                Status::InternalServerError,
                "Server state is not initialised".to_string(),
            );
            return Outcome::Failure((Status::InternalServerError, err));
        };

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return Outcome::Failure((Status::Unauthorized, unauthorized()));
        };

        let token = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(e) => {
                debug!("Rejected admin token: {e}");
                return Outcome::Failure((Status::Unauthorized, unauthorized()));
            }
        };

        match store.admin_by_id(token.id).await {
            Ok(admin) => admin
                .map(|_| token)
                .into_outcome((Status::Unauthorized, unauthorized())),
            Err(e) => Outcome::Failure((Status::InternalServerError, e)),
        }
    }
}
