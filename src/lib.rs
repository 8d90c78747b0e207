#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

use crate::{
    chat::ChatFairing,
    config::{ConfigFairing, DatabaseFairing},
    logging::LoggerFairing,
    realtime::RealtimeFairing,
};

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod realtime;

/// Build the server from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    rocket_for_figment(rocket::Config::figment())
}

/// Build the server from the given configuration. The fairings run in the
/// order attached: later ones rely on the [`config::Config`] being managed.
pub fn rocket_for_figment(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(RealtimeFairing)
        .attach(ChatFairing)
        .attach(LoggerFairing)
}

/// A server on a fresh in-memory store, with nothing reachable outside the
/// process.
#[cfg(test)]
pub(crate) fn test_rocket() -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("store", "memory"))
        .merge(("log_level", "off"))
        .merge(("jwt_secret", "test-jwt-secret"))
        .merge(("auth_ttl", 3600))
        .merge(("voter_ttl", 3600))
        .merge(("admin_username", "admin"))
        .merge(("admin_password", "admin123"))
        .merge(("chat_endpoint", "http://127.0.0.1:9/chat"))
        .merge(("chat_timeout", 2));
    rocket_for_figment(figment)
}
