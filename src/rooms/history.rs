use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{AppResult, db::Storage};

use super::msg::Message;

/// Messages kept per room; older ones are dropped first.
pub const HISTORY_CAP: usize = 100;

pub fn history_key(room_id: &str) -> String {
    format!("history_{room_id}")
}

#[derive(Clone)]
pub struct HistoryStore {
    storage: Storage,
    cap: usize,
    append_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_cap(storage, HISTORY_CAP)
    }

    pub fn with_cap(storage: Storage, cap: usize) -> Self {
        Self {
            storage,
            cap,
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn append(&self, message: &Message) {
        if let Err(e) = self.try_append(message).await {
            warn!(room_id = %message.room_id, message_id = %message.id, "dropped history write: {e}");
        }
    }

    pub async fn read(&self, room_id: &str) -> Vec<Message> {
        match self.storage.get(&history_key(room_id)).await {
            Ok(raw) => parse(room_id, raw.as_deref()),
            Err(e) => {
                debug!(room_id, "history unavailable, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    async fn try_append(&self, message: &Message) -> AppResult<()> {
        // serializes read-modify-write between contexts sharing this store
        let _guard = self.append_lock.lock().await;

        // a failed get must not turn into an overwrite of the stored log
        let raw = self.storage.get(&history_key(&message.room_id)).await?;
        let mut log = parse(&message.room_id, raw.as_deref());
        log.push(message.clone());
        if log.len() > self.cap {
            let excess = log.len() - self.cap;
            log.drain(..excess);
        }

        self.storage
            .set(&history_key(&message.room_id), &serde_json::to_string(&log)?)
            .await
    }
}

fn parse(room_id: &str, raw: Option<&str>) -> Vec<Message> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        debug!(room_id, "corrupt history, treating as empty: {e}");
        Vec::new()
    })
}
