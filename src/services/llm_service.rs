use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::config::{self, Config};
use crate::models::chat_message::{ChatMessage, Role};

const GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Gemini API key is not configured")]
    NotConfigured,

    #[error("Gemini request failed: {0}")]
    Transport(String),

    #[error("Gemini returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Gemini returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        LlmError::Transport(error.to_string())
    }
}

/// A chat-completion backend: given the whole history, produce the next model turn.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, LlmError>;

    fn is_configured(&self) -> bool;
}

/// Sampling and safety knobs, mirrored one-to-one into the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub safety_threshold: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            model: config::MODEL_NAME.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 1024,
            safety_threshold: "BLOCK_NONE".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    settings: ModelSettings,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, settings: ModelSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GEMINI_TIMEOUT)
            .build()
            .unwrap_or_default();
        GeminiClient {
            client,
            api_base: config::GEMINI_API_BASE.to_string(),
            api_key,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let settings = ModelSettings {
            model: config.gemini_model.clone(),
            ..ModelSettings::default()
        };
        GeminiClient::new(config.gemini_api_key.clone(), settings)
    }

    /// Targets another Gemini-compatible host instead of Google's endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, history: &[ChatMessage]) -> GenerateRequest {
        let contents = history
            .iter()
            .map(|message| Content {
                role: Some(
                    match message.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: Some(message.text.clone()),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
                top_k: self.settings.top_k,
                max_output_tokens: self.settings.max_output_tokens,
            },
            safety_settings: HARM_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: self.settings.safety_threshold.clone(),
                })
                .collect(),
        }
    }
}

/// Joins the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.settings.model
        );

        debug!("Sending {} messages to {}", history.len(), self.settings.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&self.build_request(history))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&raw) {
                Ok(envelope) => format!("{} {}", envelope.error.status, envelope.error.message)
                    .trim()
                    .to_string(),
                Err(_) => raw,
            };
            error!("Gemini error {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        response_text(body).ok_or(LlmError::EmptyResponse)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
