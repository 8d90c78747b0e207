//! In-process change notifications.
//!
//! Every successful write to a watched table publishes a [`ChangeEvent`] on
//! that table's [`Topic`]. Subscribers (the server-sent event streams in
//! [`crate::api`]) treat an event purely as a signal to re-fetch; events carry
//! no row data.

use std::fmt;

use rocket::{
    fairing::{Fairing, Info, Kind},
    request::{self, FromRequest, Request},
    tokio::sync::broadcast::{self, Receiver, Sender},
    Build, Rocket, State,
};
use serde::{Deserialize, Serialize};

/// Events buffered per topic before slow subscribers start skipping.
const CHANNEL_CAPACITY: usize = 64;

/// A watched table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Votes,
    AuditLogs,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Votes => "votes",
            Self::AuditLogs => "audit_logs",
        })
    }
}

/// What happened to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: Topic,
    pub kind: ChangeKind,
}

/// Fan-out of change events, one broadcast channel per topic.
#[derive(Debug, Clone)]
pub struct Notifier {
    votes: Sender<ChangeEvent>,
    audit_logs: Sender<ChangeEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            votes: broadcast::channel(CHANNEL_CAPACITY).0,
            audit_logs: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    fn sender(&self, topic: Topic) -> &Sender<ChangeEvent> {
        match topic {
            Topic::Votes => &self.votes,
            Topic::AuditLogs => &self.audit_logs,
        }
    }

    /// Start receiving events for `topic`. Only events published after this
    /// call are delivered.
    pub fn subscribe(&self, topic: Topic) -> Receiver<ChangeEvent> {
        self.sender(topic).subscribe()
    }

    /// Publish an event, returning how many subscribers will see it.
    /// Having no subscribers is not an error.
    pub fn publish(&self, topic: Topic, kind: ChangeKind) -> usize {
        let event = ChangeEvent { topic, kind };
        let receivers = self.sender(topic).send(event).unwrap_or(0);
        debug!("Published {kind:?} on {topic} to {receivers} subscriber(s)");
        receivers
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Notifier {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        req.guard::<&State<Notifier>>()
            .await
            .map(|notifier| notifier.inner().clone())
    }
}

/// A fairing that places a fresh [`Notifier`] into managed state.
pub struct RealtimeFairing;

#[rocket::async_trait]
impl Fairing for RealtimeFairing {
    fn info(&self) -> Info {
        Info {
            name: "Realtime",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        Ok(rocket.manage(Notifier::new()))
    }
}

#[cfg(test)]
mod tests {
    use rocket::{serde::json::serde_json, tokio::sync::broadcast::error::TryRecvError};

    use super::*;

    #[test]
    fn events_reach_only_their_topic() {
        let notifier = Notifier::new();
        let mut votes = notifier.subscribe(Topic::Votes);
        let mut logs = notifier.subscribe(Topic::AuditLogs);

        assert_eq!(notifier.publish(Topic::Votes, ChangeKind::Insert), 1);

        assert_eq!(
            votes.try_recv().unwrap(),
            ChangeEvent {
                topic: Topic::Votes,
                kind: ChangeKind::Insert
            }
        );
        assert_eq!(logs.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn publishing_without_subscribers() {
        let notifier = Notifier::new();
        assert_eq!(notifier.publish(Topic::AuditLogs, ChangeKind::Insert), 0);
        // Late subscribers don't see earlier events.
        let mut logs = notifier.subscribe(Topic::AuditLogs);
        assert_eq!(logs.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn slow_subscribers_lag() {
        let notifier = Notifier::new();
        let mut votes = notifier.subscribe(Topic::Votes);
        for _ in 0..CHANNEL_CAPACITY + 3 {
            notifier.publish(Topic::Votes, ChangeKind::Insert);
        }
        assert_eq!(votes.try_recv(), Err(TryRecvError::Lagged(3)));
        assert!(votes.try_recv().is_ok());
    }

    #[test]
    fn event_json() {
        let event = ChangeEvent {
            topic: Topic::AuditLogs,
            kind: ChangeKind::Insert,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"topic":"audit_logs","kind":"insert"}"#
        );
    }
}
