use std::ops::{Deref, DerefMut};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{mongodb::Id, store::Datastore},
};

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
}

impl AdminCore {
    /// Create an admin, hashing the password with a fresh random salt.
    pub fn new(username: String, password: &str) -> Result<Self> {
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())?;
        Ok(Self {
            username,
            password_hash,
        })
    }

    /// Check whether the given password is correct.
    /// A malformed stored hash never matches.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Ensure an admin with the given username exists, creating it with the given
/// password if not. An existing admin's password is left untouched.
pub async fn ensure_admin_exists(store: &Datastore, username: &str, password: &str) -> Result<()> {
    if store.admin(username).await?.is_some() {
        debug!("Admin '{username}' already exists");
        return Ok(());
    }
    let admin = NewAdmin::new(username.to_string(), password)?;
    store.insert_admin(admin).await?;
    warn!("Created default admin '{username}'; change its password for any real deployment");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let admin = AdminCore::new("coordinator".to_string(), "hunter2").unwrap();
        assert_ne!(admin.password_hash, "hunter2");
        assert!(admin.verify_password("hunter2"));
        assert!(!admin.verify_password("hunter3"));
        assert!(!admin.verify_password(""));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let admin = AdminCore {
            username: "coordinator".to_string(),
            password_hash: "not a hash".to_string(),
        };
        assert!(!admin.verify_password("not a hash"));
    }

    #[rocket::async_test]
    async fn default_admin_is_created_once() {
        let store = Datastore::memory();
        ensure_admin_exists(&store, "admin", "first").await.unwrap();
        ensure_admin_exists(&store, "admin", "second").await.unwrap();

        let admin = store.admin("admin").await.unwrap().unwrap();
        assert!(admin.verify_password("first"));
        assert!(!admin.verify_password("second"));
    }
}
