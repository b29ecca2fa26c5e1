use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{AppResult, config::AiConfig};

pub const MENTION: &str = "@gemini";
pub const TEMPERATURE: f32 = 0.7;
pub const SYSTEM_INSTRUCTION: &str = "You are Gemini, the built-in AI assistant for the Nexus Messenger. You are helpful, concise, and professional. You acknowledge that you live within a browser-based local messenger.";

pub const UNAVAILABLE_REPLY: &str = "Error: API Key is missing. Gemini assistance is unavailable.";
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't generate a response.";
pub const FAILURE_REPLY: &str = "Something went wrong with the AI integration. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

pub fn wants_reply(in_ai_room: bool, content: &str) -> bool {
    in_ai_room || content.to_lowercase().contains(MENTION)
}

#[derive(Clone)]
pub struct Gemini {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl Gemini {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn complete(&self, prompt: &str) -> String {
        self.complete_with_history(prompt, &[]).await
    }

    pub async fn complete_with_history(&self, prompt: &str, history: &[Turn]) -> String {
        let Some(api_key) = &self.api_key else {
            return UNAVAILABLE_REPLY.to_owned();
        };

        match self.generate(api_key, prompt, history).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_REPLY.to_owned(),
            Err(e) => {
                error!(model = %self.model, "gemini request failed: {e}");
                FAILURE_REPLY.to_owned()
            }
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str, history: &[Turn]) -> AppResult<Option<String>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some(Role::User),
            parts: vec![Part { text: prompt }],
        });

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION }],
            },
            contents,
            generation_config: GenerationConfig { temperature: TEMPERATURE },
        };

        debug!(model = %self.model, turns = history.len() + 1, "asking gemini");
        let response: GenerateResponse = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        Ok((!text.trim().is_empty()).then_some(text))
    }
}
