use tracing::warn;

use crate::{
    broadcast::{Channel, Envelope, EventKind, Hub, Subscription},
    profiles::User,
    rooms::{HistoryStore, Message},
};

pub struct Messenger {
    channel: Channel,
    history: HistoryStore,
}

impl Messenger {
    pub fn open(hub: &Hub, history: HistoryStore) -> Self {
        Self {
            channel: hub.open(),
            history,
        }
    }

    pub async fn send(&self, message: &Message) {
        self.history.append(message).await;
        self.publish(Envelope::Message(message.clone()));
    }

    pub fn announce_presence(&self, user: &User) {
        self.publish(Envelope::Presence(user.clone()));
    }

    pub fn on_message<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Message) + Send + Sync + 'static,
    {
        self.channel.subscribe(EventKind::Message, move |envelope| {
            if let Envelope::Message(message) = envelope {
                handler(message.clone());
            }
        })
    }

    pub fn on_presence<F>(&self, handler: F) -> Subscription
    where
        F: Fn(User) + Send + Sync + 'static,
    {
        self.channel.subscribe(EventKind::Presence, move |envelope| {
            if let Envelope::Presence(user) = envelope {
                handler(user.clone());
            }
        })
    }

    pub async fn history(&self, room_id: &str) -> Vec<Message> {
        self.history.read(room_id).await
    }

    pub fn close(self) {
        self.channel.close();
    }

    fn publish(&self, envelope: Envelope) {
        if let Err(e) = self.channel.publish(&envelope) {
            warn!(context = %self.channel.id(), "broadcast failed: {e}");
        }
    }
}
