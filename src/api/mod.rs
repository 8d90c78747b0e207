use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod admin;
mod auth;
mod chat;
mod common;
mod events;
mod public;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(auth::routes());
    routes.extend(chat::routes());
    routes.extend(events::routes());
    routes.extend(public::routes());
    routes.extend(voting::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Give every failure without a body of its own, e.g. a failed request guard
/// or malformed JSON, the same JSON error shape.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: status.reason_lossy().to_string(),
    })
}
