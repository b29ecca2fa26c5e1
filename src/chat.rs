use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicUsize, Ordering},
};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    ai::{self, Gemini},
    broadcast::Subscription,
    messenger::Messenger,
    profiles::User,
    rooms::{AI_ROOM_ID, Message, Room},
};

#[derive(Default)]
struct View {
    room_id: String,
    messages: Vec<Message>,
}

fn lock(view: &Mutex<View>) -> MutexGuard<'_, View> {
    view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push(view: &Mutex<View>, room_id: &str, message: Message) {
    let mut view = lock(view);
    if view.room_id == room_id {
        view.messages.push(message);
    }
}

struct Typing(Arc<AtomicUsize>);

impl Typing {
    fn start(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending.clone())
    }
}

impl Drop for Typing {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Outgoing {
    pub message: Message,
    /// Set when the message asked the assistant something; resolves to the
    /// reply once it has been sent.
    pub ai_reply: Option<JoinHandle<Message>>,
}

pub struct ChatSession {
    messenger: Arc<Messenger>,
    gemini: Gemini,
    user: User,
    view: Arc<Mutex<View>>,
    ai_pending: Arc<AtomicUsize>,
    subscription: Option<Subscription>,
}

impl ChatSession {
    pub async fn join(messenger: Arc<Messenger>, gemini: Gemini, user: User, room_id: &str) -> Self {
        let mut session = Self {
            messenger,
            gemini,
            user,
            view: Arc::default(),
            ai_pending: Arc::default(),
            subscription: None,
        };
        session.switch_room(room_id).await;
        session
    }

    pub async fn switch_room(&mut self, room_id: &str) {
        let room_id = Room::find(room_id).id;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        {
            let mut view = lock(&self.view);
            view.room_id = room_id.to_owned();
            view.messages.clear();
        }

        let view = self.view.clone();
        self.subscription = Some(self.messenger.on_message(move |message| {
            if message.room_id == room_id {
                push(&view, room_id, message);
            }
        }));

        // anything broadcast meanwhile is either in the stored history already
        // or was pushed by the handler above
        let history = self.messenger.history(room_id).await;
        let mut view = lock(&self.view);
        let arrived = std::mem::replace(&mut view.messages, history);
        for message in arrived {
            if !view.messages.iter().any(|m| m.id == message.id) {
                view.messages.push(message);
            }
        }

        info!(user = %self.user.name, room_id, shown = view.messages.len(), "joined room");
    }

    pub async fn send_text(&self, content: &str) -> Option<Outgoing> {
        if content.trim().is_empty() {
            return None;
        }

        let room_id = self.room().id;
        let message = Message::text(&self.user, room_id, content);
        push(&self.view, room_id, message.clone());
        self.messenger.send(&message).await;

        let ai_reply = ai::wants_reply(room_id == AI_ROOM_ID, content)
            .then(|| self.ask_ai(room_id, content.to_owned()));

        Some(Outgoing { message, ai_reply })
    }

    fn ask_ai(&self, room_id: &'static str, prompt: String) -> JoinHandle<Message> {
        let messenger = self.messenger.clone();
        let gemini = self.gemini.clone();
        let view = self.view.clone();
        let typing = Typing::start(&self.ai_pending);

        debug!(room_id, "asking the assistant");
        tokio::spawn(async move {
            let text = gemini.complete(&prompt).await;
            let reply = Message::ai(room_id, &text);
            drop(typing);

            push(&view, room_id, reply.clone());
            messenger.send(&reply).await;
            reply
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn room(&self) -> &'static Room {
        Room::find(&lock(&self.view).room_id)
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.view).messages.clone()
    }

    pub fn ai_typing(&self) -> bool {
        self.ai_pending.load(Ordering::SeqCst) > 0
    }

    pub fn leave(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
