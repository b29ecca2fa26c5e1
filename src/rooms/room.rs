use serde::Serialize;

pub const AI_ROOM_ID: &str = "nexus-ai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_ROOMS: [Room; 3] = [
    Room {
        id: "general",
        name: "General Chat",
        icon: "fa-globe",
        description: "The public square for everyone.",
    },
    Room {
        id: "ideas",
        name: "Bright Ideas",
        icon: "fa-lightbulb",
        description: "Share your creative thoughts.",
    },
    Room {
        id: AI_ROOM_ID,
        name: "Nexus AI Lab",
        icon: "fa-microchip",
        description: "Interact with the built-in Gemini AI.",
    },
];

impl Room {
    /// Looks a room up by id, falling back to the first room.
    pub fn find(id: &str) -> &'static Room {
        DEFAULT_ROOMS
            .iter()
            .find(|room| room.id == id)
            .unwrap_or(&DEFAULT_ROOMS[0])
    }

    pub fn exists(id: &str) -> bool {
        DEFAULT_ROOMS.iter().any(|room| room.id == id)
    }

    pub fn is_ai_room(&self) -> bool {
        self.id == AI_ROOM_ID
    }
}
