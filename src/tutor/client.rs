use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ApiKey;
use crate::config::{NetworkConfig, TutorConfig};

/// Everything that can go wrong asking the tutor. Payloads are strings so
/// the error can be cloned into the chat completion command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TutorError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("The tutor returned no answer")]
    EmptyResponse,
}

// ==================== Wire Types ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

/// Response envelope. Successful replies carry `candidates`; failures carry
/// `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: String,
}

impl GenerateRequest {
    pub fn new(prompt: &str, config: &TutorConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
                top_k: config.top_k,
            },
        }
    }
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn reply_text(&self) -> Result<String, TutorError> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(TutorError::EmptyResponse)
    }
}

// ==================== Client ====================

/// Client for the generative-language `generateContent` endpoint.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: TutorConfig,
}

impl GeminiClient {
    /// Create a new client with configurable timeouts.
    pub fn new(config: &TutorConfig, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// `{base_url}/{api_version}/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            self.config.model
        )
    }

    /// Send one prompt and return the reply text. Never retries.
    pub async fn generate(&self, key: &ApiKey, prompt: &str) -> Result<String, TutorError> {
        let url = reqwest::Url::parse_with_params(&self.endpoint(), &[("key", key.expose())])
            .map_err(|e| TutorError::Network(format!("Invalid endpoint URL: {}", e)))?;
        let request = GenerateRequest::new(prompt, &self.config);

        tracing::debug!("Sending tutor request to {}", self.endpoint());
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TutorError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TutorError::Network(e.without_url().to_string()))?;

        match serde_json::from_str::<GenerateResponse>(&body) {
            Ok(parsed) => {
                if let Some(error) = parsed.error {
                    return Err(TutorError::Provider {
                        status: error.code.unwrap_or(status.as_u16()),
                        message: error.message,
                    });
                }
                if !status.is_success() {
                    return Err(TutorError::Provider {
                        status: status.as_u16(),
                        message: status.canonical_reason().unwrap_or("error").to_string(),
                    });
                }
                parsed.reply_text()
            }
            Err(_) if !status.is_success() => Err(TutorError::Provider {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            }),
            Err(e) => Err(TutorError::InvalidResponse(e.to_string())),
        }
    }
}
