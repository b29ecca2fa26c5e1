use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::User;

pub const AI_SENDER_ID: &str = "gemini-ai";
pub const AI_SENDER_NAME: &str = "Gemini AI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    System,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl Message {
    pub fn new(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        room_id: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: Uuid::now_v7().simple().to_string(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            content: content.into(),
            timestamp: now_millis(),
            room_id: room_id.into(),
            kind,
        }
    }

    pub fn text(user: &User, room_id: &str, content: &str) -> Self {
        Self::new(&user.id, &user.name, room_id, content, MessageKind::Text)
    }

    pub fn ai(room_id: &str, content: &str) -> Self {
        Self::new(AI_SENDER_ID, AI_SENDER_NAME, room_id, content, MessageKind::Ai)
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
