use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

use crate::AppResult;

#[derive(Clone)]
pub struct Storage {
    db_pool: SqlitePool,
}

impl Storage {
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqlitePoolOptions::new();
        // every connection to `:memory:` is its own database, so pin a single one
        let options = if url.contains(":memory:") || url.contains("mode=memory") {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options.max_connections(16)
        };

        let db_pool = options.connect(url).await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)")
            .execute(&db_pool)
            .await?;

        info!(url, "storage ready");
        Ok(Self { db_pool })
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key=?")
            .bind(key)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(value.map(|(value,)| value))
    }

    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO kv (key,value) VALUES (?,?) ON CONFLICT(key) DO UPDATE SET value=excluded.value")
            .bind(key)
            .bind(value)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM kv WHERE key=?")
            .bind(key)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.db_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = Storage::connect("sqlite::memory:").await.unwrap();

        assert_eq!(storage.get("missing").await.unwrap(), None);

        storage.set("k", "one").await.unwrap();
        storage.set("k", "two").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("two"));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_the_same_data() {
        let storage = Storage::connect("sqlite::memory:").await.unwrap();
        let other = storage.clone();

        storage.set("shared", "yes").await.unwrap();
        assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("yes"));
    }
}
