use anyhow::{Context, anyhow};

use crate::{AppResult, broadcast};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://nexus.db?mode=rwc";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub channel_capacity: usize,
    pub ai: AiConfig,
}

#[derive(Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_AI_BASE_URL.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let set = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let channel_capacity = match set("NEXUS_CHANNEL_CAPACITY") {
            Some(raw) => {
                let capacity: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("NEXUS_CHANNEL_CAPACITY={raw:?}"))?;
                if capacity == 0 {
                    return Err(anyhow!("NEXUS_CHANNEL_CAPACITY must be positive").into());
                }
                capacity
            }
            None => broadcast::DEFAULT_CAPACITY,
        };

        Ok(Self {
            database_url: set("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
            channel_capacity,
            ai: AiConfig {
                api_key: set("API_KEY").map(|key| key.trim().to_owned()),
                model: set("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
                base_url: set("GEMINI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_owned())
                    .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_owned()),
            },
        })
    }
}
