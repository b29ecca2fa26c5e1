use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AVATARS: [&str; 6] = [
    "https://picsum.photos/seed/user1/200",
    "https://picsum.photos/seed/user2/200",
    "https://picsum.photos/seed/user3/200",
    "https://picsum.photos/seed/user4/200",
    "https://picsum.photos/seed/user5/200",
    "https://picsum.photos/seed/user6/200",
];

pub const COLORS: [&str; 6] = [
    "bg-blue-500",
    "bg-emerald-500",
    "bg-violet-500",
    "bg-rose-500",
    "bg-amber-500",
    "bg-indigo-500",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Offline,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub color: String,
    pub status: Status,
}

impl User {
    pub fn new(name: &str, avatar: &str, color: &str) -> Option<Self> {
        if name.trim().is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::now_v7().simple().to_string(),
            name: name.to_owned(),
            avatar: avatar.to_owned(),
            color: color.to_owned(),
            status: Status::Online,
        })
    }

    pub fn with_random_look(name: &str) -> Option<Self> {
        let mut rng = rand::rng();
        let avatar = AVATARS.choose(&mut rng).unwrap_or(&AVATARS[0]);
        let color = COLORS.choose(&mut rng).unwrap_or(&COLORS[0]);

        Self::new(name, avatar, color)
    }
}
