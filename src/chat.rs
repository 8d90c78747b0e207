//! Client for the hosted chat assistant.

use std::time::Duration;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Client, StatusCode};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Shown when the assistant answered without any text.
pub const FALLBACK_REPLY: &str = "I apologize, I couldn't process your request. Please try again.";
/// Shown when the assistant could not be reached or returned an error.
pub const ERROR_REPLY: &str = "I'm sorry, I encountered an error. Please try again later.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Chat endpoint returned {0}")]
    Status(StatusCode),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

/// Forwards chat messages to the configured endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Send one message and return the assistant's raw answer, if it gave one.
    pub async fn ask(&self, message: &str, session_id: &str) -> Result<Option<String>, ChatError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                message,
                session_id,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status));
        }
        let body: ChatResponse = response.json().await?;
        Ok(body.response)
    }

    /// Send one message and always come back with something to show the user.
    pub async fn reply(&self, message: &str, session_id: &str) -> String {
        match self.ask(message, session_id).await {
            Ok(response) => reply_text(response),
            Err(e) => {
                error!("{e}");
                ERROR_REPLY.to_string()
            }
        }
    }
}

/// The text to show for an assistant answer, falling back when it is empty.
pub fn reply_text(response: Option<String>) -> String {
    response
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

/// A fresh conversation ID for clients that didn't bring one.
pub fn new_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("session_{}_{suffix}", Utc::now().timestamp_millis())
}

/// A fairing that builds the [`ChatClient`] from the application config and
/// places it into managed state. Must be attached after
/// [`crate::config::ConfigFairing`].
pub struct ChatFairing;

#[rocket::async_trait]
impl Fairing for ChatFairing {
    fn info(&self) -> Info {
        Info {
            name: "Chat",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Application config must be loaded before the chat client");
            return Err(rocket);
        };
        let client = match ChatClient::new(
            config.chat_endpoint().to_string(),
            config.chat_api_key().map(str::to_string),
            config.chat_timeout(),
        ) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build chat client: {e}");
                return Err(rocket);
            }
        };
        info!("Chat assistant at {}", config.chat_endpoint());
        Ok(rocket.manage(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answers_fall_back() {
        assert_eq!(reply_text(None), FALLBACK_REPLY);
        assert_eq!(reply_text(Some(String::new())), FALLBACK_REPLY);
        assert_eq!(reply_text(Some("Polls close at 8pm.".into())), "Polls close at 8pm.");
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = rocket::serde::json::serde_json::to_value(ChatRequest {
            message: "hi",
            session_id: "session_1_abc",
        })
        .unwrap();
        assert_eq!(body["sessionId"], "session_1_abc");
        assert_eq!(body["message"], "hi");
    }

    #[test]
    fn session_ids() {
        let id = new_session_id();
        assert!(id.starts_with("session_"));
        assert_ne!(id, new_session_id());
    }

    #[rocket::async_test]
    async fn unreachable_endpoint_apologises() {
        let client = ChatClient::new(
            "http://127.0.0.1:9/chat".to_string(),
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(client.ask("hello", "s").await.is_err());
        assert_eq!(client.reply("hello", "s").await, ERROR_REPLY);
    }
}
