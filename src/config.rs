use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    db::admin::ensure_admin_exists,
    store::{Datastore, MongoStore},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    voter_ttl: u32,
    admin_username: String,
    chat_endpoint: String,
    chat_timeout: u32,
    // secrets
    jwt_secret: String,
    admin_password: String,
    chat_api_key: Option<String>,
}

impl Config {
    /// Valid lifetime of admin auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// How long a browser keeps the connected voter ID.
    pub fn voter_ttl(&self) -> Duration {
        Duration::seconds(self.voter_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Username of the admin ensured at startup.
    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    /// Initial password of the admin ensured at startup. Ignored if that admin
    /// already exists.
    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    /// URL of the hosted chat assistant.
    pub fn chat_endpoint(&self) -> &str {
        &self.chat_endpoint
    }

    /// Bearer key for the chat assistant, if it needs one.
    pub fn chat_api_key(&self) -> Option<&str> {
        self.chat_api_key.as_deref()
    }

    /// Request timeout for the chat assistant.
    pub fn chat_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.chat_timeout.into())
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which datastore backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Mongodb,
    Memory,
}

/// Configuration for the datastore.
#[derive(Deserialize)]
struct DbConfig {
    store: StoreKind,
    // secrets
    db_uri: Option<String>,
}

/// A fairing that loads the datastore config, connects to the database if
/// needed, performs any setup necessary, and places a [`Datastore`] into
/// managed state. Must be attached after [`ConfigFairing`].
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "Datastore",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let store = match config.store {
            StoreKind::Memory => {
                warn!("Using the in-memory datastore; nothing will be persisted");
                Datastore::memory()
            }
            StoreKind::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("The mongodb datastore needs a `db_uri`");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                let client = match MongoClient::with_uri_str(db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                let db = client.database(DATABASE_NAME);
                // Also ensures the required indexes exist.
                match MongoStore::connect(&db).await {
                    Ok(store) => Datastore::new(store),
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                }
            }
        };

        // Ensure there is at least one admin user.
        let Some(app_config) = rocket.state::<Config>() else {
            error!("Application config must be loaded before the datastore");
            return Err(rocket);
        };
        if let Err(e) = ensure_admin_exists(
            &store,
            app_config.admin_username(),
            app_config.admin_password(),
        )
        .await
        {
            error!("Failed to set up the default admin: {e}");
            return Err(rocket);
        }
        info!("...datastore online!");

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

/// The MongoDB database holding every collection.
const DATABASE_NAME: &str = "evote";

#[cfg(test)]
mod tests {
    use rocket::figment::Figment;

    use super::*;

    #[test]
    fn store_kind_from_config() {
        let figment = Figment::new().merge(("store", "memory"));
        let config: DbConfig = figment.extract().unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.db_uri.is_none());

        let figment = Figment::new().merge(("store", "postgres"));
        assert!(figment.extract::<DbConfig>().is_err());
    }

    #[test]
    fn durations() {
        let figment = Figment::new()
            .merge(("auth_ttl", 60))
            .merge(("voter_ttl", 120))
            .merge(("admin_username", "admin"))
            .merge(("admin_password", "pw"))
            .merge(("chat_endpoint", "http://localhost/chat"))
            .merge(("chat_timeout", 5))
            .merge(("jwt_secret", "secret"));
        let config: Config = figment.extract().unwrap();
        assert_eq!(config.auth_ttl(), Duration::seconds(60));
        assert_eq!(config.voter_ttl(), Duration::minutes(2));
        assert_eq!(config.chat_timeout(), std::time::Duration::from_secs(5));
        assert_eq!(config.chat_api_key(), None);
        assert_eq!(config.jwt_secret(), b"secret");
    }
}
