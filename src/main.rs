use std::sync::Arc;

use nexus::{
    AppResult, ChatSession, Config, Hub, Messenger, Storage,
    ai::Gemini,
    chat::Outgoing,
    logger,
    profiles::ProfileStore,
    rooms::{DEFAULT_ROOMS, HistoryStore, Message, Room},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

#[tokio::main]
async fn main() -> AppResult<()> {
    logger::init_tracing();

    let config = Config::from_env()?;
    let storage = Storage::connect(&config.database_url).await?;
    let hub = Hub::new(config.channel_capacity);
    let history = HistoryStore::new(storage.clone());
    let profiles = ProfileStore::new(storage);

    let gemini = Gemini::new(&config.ai);
    if !gemini.is_configured() {
        warn!("API_KEY is not set, the assistant will only apologize");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let user = match profiles.load().await {
        Some(user) => user,
        None => loop {
            println!("pick a username:");
            let Some(name) = lines.next_line().await? else {
                return Ok(());
            };
            match profiles.setup(&name, None, None).await {
                Ok(user) => break user,
                Err(e) => println!("{e}"),
            }
        },
    };

    // a second context on the hub, standing in for another open tab
    let mirror = Messenger::open(&hub, history.clone());
    let mirror_messages = mirror.on_message(|message| print_message(&message));
    let mirror_presence = mirror.on_presence(|user| println!("* {} is {:?}", user.name, user.status));

    let messenger = Arc::new(Messenger::open(&hub, history));
    messenger.announce_presence(&user);

    let mut session = ChatSession::join(messenger, gemini, user, "general").await;
    print_room(&session);

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/rooms", _) => {
                for room in DEFAULT_ROOMS {
                    println!("{:<10} {} - {}", room.id, room.name, room.description);
                }
            }
            ("/room", id) => {
                let id = id.trim();
                if !Room::exists(id) {
                    println!("no room called {id:?}, try /rooms");
                    continue;
                }
                session.switch_room(id).await;
                print_room(&session);
            }
            ("/logout", _) => {
                profiles.logout().await?;
                println!("profile cleared");
                break;
            }
            _ => {
                if let Some(Outgoing { ai_reply: Some(_), .. }) = session.send_text(line).await {
                    println!("  Gemini AI is typing...");
                }
            }
        }
    }

    session.leave();
    mirror_messages.unsubscribe();
    mirror_presence.unsubscribe();
    mirror.close();
    Ok(())
}

fn print_room(session: &ChatSession) {
    let room = session.room();
    println!("== {} ({}) - {}", room.name, room.id, room.description);
    for message in session.messages() {
        print_message(&message);
    }
}

fn print_message(message: &Message) {
    println!("[{}] {}: {}", message.room_id, message.sender_name, message.content);
}
