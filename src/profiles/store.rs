use anyhow::anyhow;
use tracing::{debug, info};

use crate::{AppResult, db::Storage};

use super::user::User;

pub const USER_KEY: &str = "nexus_user";

#[derive(Clone)]
pub struct ProfileStore {
    storage: Storage,
}

impl ProfileStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The stored profile, if any. Unreadable records count as absent.
    pub async fn load(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                debug!("profile unavailable: {e}");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| debug!("ignoring unreadable profile: {e}"))
            .ok()
    }

    pub async fn save(&self, user: &User) -> AppResult<()> {
        self.storage
            .set(USER_KEY, &serde_json::to_string(user)?)
            .await
    }

    pub async fn setup(&self, name: &str, avatar: Option<&str>, color: Option<&str>) -> AppResult<User> {
        let user = match (avatar, color) {
            (Some(avatar), Some(color)) => User::new(name, avatar, color),
            _ => User::with_random_look(name).map(|mut user| {
                if let Some(avatar) = avatar {
                    user.avatar = avatar.to_owned();
                }
                if let Some(color) = color {
                    user.color = color.to_owned();
                }
                user
            }),
        }
        .ok_or(anyhow!("a profile needs a non-blank name"))?;

        self.save(&user).await?;
        info!(user_id = %user.id, name = %user.name, "profile created");
        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.storage.remove(USER_KEY).await?;
        info!("profile cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::profiles::{COLORS, Status};

    use super::*;

    async fn profiles() -> (Storage, ProfileStore) {
        let storage = Storage::connect("sqlite::memory:").await.unwrap();
        (storage.clone(), ProfileStore::new(storage))
    }

    #[tokio::test]
    async fn setup_then_load_then_logout() {
        let (_, profiles) = profiles().await;
        assert!(profiles.load().await.is_none());

        let user = profiles.setup("Ada", None, Some(COLORS[2])).await.unwrap();
        assert_eq!(user.color, COLORS[2]);
        assert_eq!(user.status, Status::Online);
        assert_eq!(profiles.load().await, Some(user));

        profiles.logout().await.unwrap();
        assert!(profiles.load().await.is_none());
    }

    #[tokio::test]
    async fn blank_name_is_an_error_and_stores_nothing() {
        let (_, profiles) = profiles().await;

        assert!(profiles.setup("  ", None, None).await.is_err());
        assert!(profiles.load().await.is_none());
    }

    #[tokio::test]
    async fn unreadable_profile_counts_as_absent() {
        let (storage, profiles) = profiles().await;
        storage.set(USER_KEY, "[]").await.unwrap();

        assert!(profiles.load().await.is_none());
    }
}
