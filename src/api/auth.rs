use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::{AdminToken, VoterConnect, VoterSession, AUTH_TOKEN_COOKIE, VOTER_COOKIE},
        },
        store::Datastore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        authenticate,
        logout,
        connect_voter,
        disconnect_voter,
        current_voter,
    ]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
async fn authenticate(
    credentials: Json<AdminCredentials>,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
    store: Datastore,
) -> Result<()> {
    // Unknown usernames and wrong passwords look the same to the client.
    let admin = store
        .admin(&credentials.username)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(
                Status::Unauthorized,
                "Invalid username or password".to_string(),
            )
        })?;

    cookies.add(AdminToken::new(&admin).into_cookie(config)?);
    info!("Admin '{}' logged in", admin.username);
    Ok(())
}

#[delete("/auth")]
fn logout(cookies: &CookieJar<'_>) {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
}

#[post("/voter/connect", data = "<request>", format = "json")]
fn connect_voter(
    request: Json<VoterConnect>,
    cookies: &CookieJar<'_>,
    config: &State<Config>,
) -> Result<Json<VoterSession>> {
    let session = request.0.into_session()?;
    cookies.add_private(session.clone().into_cookie(config));
    Ok(Json(session))
}

#[delete("/voter/connect")]
fn disconnect_voter(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::named(VOTER_COOKIE));
}

#[get("/voter")]
fn current_voter(session: VoterSession) -> Json<VoterSession> {
    Json(session)
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::json};

    use super::*;

    #[backend_test]
    async fn admin_authenticate_valid(client: Client) {
        let response = client
            .post(uri!(authenticate))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn admin_authenticate_invalid(client: Client) {
        for credentials in [
            AdminCredentials::wrong_password(),
            AdminCredentials::unknown_user(),
        ] {
            let response = client
                .post(uri!(authenticate))
                .header(ContentType::JSON)
                .body(json!(credentials).to_string())
                .dispatch()
                .await;

            assert_eq!(Status::Unauthorized, response.status());
            assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
        }
    }

    #[backend_test(admin)]
    async fn admin_logout(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Admin routes are closed again.
        let response = client.get("/admin/dashboard").dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn voter_connect_and_disconnect(client: Client) {
        let response = client.get(uri!(current_voter)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let response = client
            .post(uri!(connect_voter))
            .header(ContentType::JSON)
            .body(json!({ "voter_id": " 0xfeed " }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let cookie = client.cookies().get_private(VOTER_COOKIE).unwrap();
        assert_eq!(cookie.value(), "0xfeed");

        let session: VoterSession = client
            .get(uri!(current_voter))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(session.voter_id, "0xfeed");

        let response = client.delete(uri!(disconnect_voter)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get_private(VOTER_COOKIE).is_none());
    }

    #[backend_test]
    async fn blank_voter_id_is_rejected(client: Client) {
        let response = client
            .post(uri!(connect_voter))
            .header(ContentType::JSON)
            .body(json!({ "voter_id": "   " }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert!(client.cookies().get_private(VOTER_COOKIE).is_none());
    }
}
