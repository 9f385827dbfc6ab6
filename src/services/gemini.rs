use crate::config::GeminiSettings;
use crate::prompts::{PromptProfile, SchemaNode};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the Gemini API
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("API Key not configured on the server")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Gemini API client
///
/// Handles the single outbound call each generation request makes:
/// building the `generateContent` payload (prompt + system instruction +
/// response schema) and relaying the upstream JSON back verbatim.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        // An empty key from a blank env var is the same as no key
        let api_key = api_key.filter(|k| !k.is_empty());

        Self {
            base_url,
            model,
            api_key,
            client,
        }
    }

    pub fn from_settings(settings: &GeminiSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            settings.model.clone(),
            settings.api_key.clone(),
        )
    }

    /// Whether a credential is configured. Used by the health endpoint.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send one generation request and return the upstream JSON unmodified.
    ///
    /// A non-success upstream status is surfaced as `GeminiError::Upstream`
    /// carrying the status and raw body text so the handler can relay both.
    /// No retries.
    pub async fn generate_content(
        &self,
        user_prompt: &str,
        profile: PromptProfile,
    ) -> Result<Value, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            api_key
        );

        let payload = GenerateContentRequest::new(user_prompt, profile);

        tracing::debug!(
            "Calling Gemini model {} ({:?}, prompt length {})",
            self.model,
            profile,
            user_prompt.len()
        );

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Gemini returned {}: {}", status, body);
            return Err(GeminiError::Upstream { status, body });
        }

        let json: Value = response.json().await?;

        Ok(json)
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: SchemaNode,
}

impl Content {
    fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl GenerateContentRequest {
    fn new(user_prompt: &str, profile: PromptProfile) -> Self {
        Self {
            contents: vec![Content::from_text(user_prompt)],
            system_instruction: Content::from_text(profile.system_instruction()),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: profile.response_schema(),
            },
        }
    }
}
