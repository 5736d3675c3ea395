//! Text-generation backend for OpenAI-compatible chat APIs.
//!
//! Endpoint: `/v1/chat/completions`, one non-streaming request per prompt.

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Settings;
use crate::error::{AppError, NarrativeError};

/// Sampling temperature used for every summary.
pub const TEMPERATURE: f64 = 0.6;

/// Anything that turns a prompt into a block of generated text.
pub trait NarrativeService {
    fn complete(&self, prompt: &str) -> Result<String, NarrativeError>;
}

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.openai_base_url.trim_end_matches('/').to_string(),
            model: settings.openai_model.clone(),
            api_key: settings.openai_api_key.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": TEMPERATURE,
        })
    }

    fn build_request(&self, api_key: &str, prompt: &str) -> RequestBuilder {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(%url, model = %self.model, prompt_chars = prompt.len(), "requesting narrative");
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&self.build_body(prompt))
    }
}

impl NarrativeService for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
        let key = self.api_key.as_ref().ok_or(NarrativeError::MissingApiKey)?;
        let resp = self.build_request(key, prompt).send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(NarrativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json_resp: Value = resp.json()?;
        extract_content(&json_resp).ok_or(NarrativeError::EmptyResponse)
    }
}

/// `choices[0].message.content`, if non-blank.
pub fn extract_content(json_resp: &Value) -> Option<String> {
    json_resp
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
