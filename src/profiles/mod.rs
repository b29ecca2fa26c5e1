mod store;
mod user;

pub use store::{ProfileStore, USER_KEY};
pub use user::{AVATARS, COLORS, Status, User};
