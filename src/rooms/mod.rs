mod history;
mod msg;
mod room;

pub use history::{HISTORY_CAP, HistoryStore, history_key};
pub use msg::{AI_SENDER_ID, AI_SENDER_NAME, Message, MessageKind};
pub use room::{AI_ROOM_ID, DEFAULT_ROOMS, Room};
