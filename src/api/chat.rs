use rocket::{serde::json::Json, Route, State};

use crate::{
    chat::{new_session_id, ChatClient},
    error::{Error, Result},
    model::api::chat::{ChatMessage, ChatReply},
};

pub fn routes() -> Vec<Route> {
    routes![chat]
}

/// Relay a message to the assistant. Assistant failures still produce a
/// (apologetic) reply rather than an error status.
#[post("/chat", data = "<message>", format = "json")]
async fn chat(message: Json<ChatMessage>, client: &State<ChatClient>) -> Result<Json<ChatReply>> {
    let ChatMessage {
        message,
        session_id,
    } = message.0;
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::validation("Please enter a message"));
    }
    let session_id = session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(new_session_id);

    let reply = client.reply(message, &session_id).await;
    Ok(Json(ChatReply { reply, session_id }))
}
