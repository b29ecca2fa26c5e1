pub mod ai;
pub mod appresult;
pub mod broadcast;
pub mod chat;
pub mod config;
pub mod db;
pub mod logger;
pub mod messenger;
pub mod profiles;
pub mod rooms;

pub use appresult::{AppError, AppResult};
pub use broadcast::{Hub, Subscription};
pub use chat::ChatSession;
pub use config::Config;
pub use db::Storage;
pub use messenger::Messenger;
