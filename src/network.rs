//! Gemini `generateContent` client used by the relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::errors::RelayError;
use crate::prompts::explain_prompt;

/// Turns selected text into a short explanation.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, text: &str) -> Result<String, RelayError>;
}

// Wire types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

/// Relay backed by the Gemini REST API.
pub struct GeminiRelay {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiRelay {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
            api_key: settings.api_key().map(str::to_string),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        }
    }

    fn request_body(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: explain_prompt(text) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl Explainer for GeminiRelay {
    async fn explain(&self, text: &str) -> Result<String, RelayError> {
        let api_key = self.api_key.as_deref().ok_or(RelayError::MissingApiKey)?;

        // The key travels in the query string; never log the full URL.
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, chars = text.chars().count(), "requesting explanation");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.without_url().to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "gemini responded");

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "gemini request failed");
            return Err(RelayError::Service { status: status.as_u16(), message });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "undecodable gemini response");
            RelayError::MalformedResponse
        })?;

        match parsed.first_text().map(str::trim) {
            Some(explanation) if !explanation.is_empty() => Ok(explanation.to_string()),
            _ => Err(RelayError::MalformedResponse),
        }
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
