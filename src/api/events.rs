use rocket::{
    response::stream::{Event, EventStream},
    tokio::{select, sync::broadcast::error::RecvError},
    Route, Shutdown,
};

use crate::realtime::{Notifier, Topic};

pub fn routes() -> Vec<Route> {
    routes![vote_events, audit_log_events]
}

/// Stream every event on `topic` until the client leaves or the server shuts
/// down. Missed events are skipped: clients re-fetch on any event anyway.
fn change_stream(notifier: Notifier, topic: Topic, mut shutdown: Shutdown) -> EventStream![] {
    let mut rx = notifier.subscribe(topic);
    EventStream! {
        loop {
            let event = select! {
                event = rx.recv() => match event {
                    Ok(event) => event,
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Subscriber to {topic} skipped {skipped} event(s)");
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };

            yield Event::json(&event).event(topic.to_string());
        }
    }
}

#[get("/events/votes")]
fn vote_events(notifier: Notifier, shutdown: Shutdown) -> EventStream![] {
    change_stream(notifier, Topic::Votes, shutdown)
}

#[get("/events/audit-logs")]
fn audit_log_events(notifier: Notifier, shutdown: Shutdown) -> EventStream![] {
    change_stream(notifier, Topic::AuditLogs, shutdown)
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client};

    use super::*;

    #[backend_test]
    async fn streams_are_event_streams(client: Client) {
        // Ask the server to stop so the streams finish after the headers.
        client.rocket().shutdown().notify();

        for uri in [uri!(vote_events), uri!(audit_log_events)] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(response.content_type(), Some(ContentType::EventStream));
        }
    }
}
