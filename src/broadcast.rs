use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{AppResult, profiles::User, rooms::Message};

pub const CHANNEL_NAME: &str = "nexus_messenger_broadcast";
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Envelope {
    Message(Message),
    Presence(User),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Presence,
}

impl Envelope {
    pub fn kind(&self) -> EventKind {
        match self {
            Envelope::Message(_) => EventKind::Message,
            Envelope::Presence(_) => EventKind::Presence,
        }
    }
}

#[derive(Clone, Debug)]
struct Frame {
    origin: Uuid,
    payload: Arc<str>,
}

#[derive(Clone)]
pub struct Hub {
    tx: broadcast::Sender<Frame>,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn open(&self) -> Channel {
        let id = Uuid::now_v7();
        let registry = Arc::new(Registry::default());
        let listener = tokio::spawn(listen(id, self.tx.subscribe(), registry.clone()));

        info!(context = %id, channel = CHANNEL_NAME, "context opened");
        Channel {
            id,
            tx: self.tx.clone(),
            registry,
            listener,
        }
    }

    pub fn open_contexts(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

type Handler = Arc<dyn Fn(&Envelope) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<EventKind, BTreeMap<u64, Handler>>>,
}

impl Registry {
    fn insert(&self, kind: EventKind, handler: Handler) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().entry(kind).or_default().insert(id, handler);
        id
    }

    fn remove(&self, kind: EventKind, id: u64) {
        if let Some(handlers) = self.lock().get_mut(&kind) {
            handlers.remove(&id);
        }
    }

    fn dispatch(&self, envelope: &Envelope) {
        // handlers run outside the lock so they may (un)subscribe
        let handlers: Vec<Handler> = self
            .lock()
            .get(&envelope.kind())
            .map(|handlers| handlers.values().cloned().collect())
            .unwrap_or_default();

        for handler in handlers {
            handler(envelope);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EventKind, BTreeMap<u64, Handler>>> {
        self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn listen(id: Uuid, mut rx: broadcast::Receiver<Frame>, registry: Arc<Registry>) {
    loop {
        match rx.recv().await {
            Ok(frame) => {
                if frame.origin == id {
                    continue;
                }

                let Ok(envelope) = serde_json::from_str::<Envelope>(&frame.payload) else {
                    debug!(context = %id, "ignoring malformed envelope");
                    continue;
                };

                registry.dispatch(&envelope);
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(context = %id, missed, "context fell behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

pub struct Channel {
    id: Uuid,
    tx: broadcast::Sender<Frame>,
    registry: Arc<Registry>,
    listener: JoinHandle<()>,
}

impl Channel {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn publish(&self, envelope: &Envelope) -> AppResult<()> {
        let payload = serde_json::to_string(envelope)?;
        self.post(payload);
        Ok(())
    }

    fn post(&self, payload: String) {
        // our own listener keeps at least one receiver alive while open
        let _ = self.tx.send(Frame {
            origin: self.id,
            payload: payload.into(),
        });
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        let id = self.registry.insert(kind, Arc::new(handler));
        Subscription {
            id,
            kind,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn close(self) {
        // Drop aborts the listener, which releases every handler
        drop(self);
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.listener.abort();
        debug!(context = %self.id, "context closed");
    }
}

// dropping a Subscription leaves its handler registered
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.kind, self.id);
        }
    }
}
