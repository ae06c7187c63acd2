//! Ollama HTTP model adapter.
//!
//! `POST {base_url}/api/generate` with `{model, prompt, stream: false}` and
//! read the `response` field. Reachability is `GET {base_url}/api/tags`.

use crate::domain::error::FundchatError;
use crate::ports::model_port::ModelPort;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub generate_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generate_timeout_secs: DEFAULT_GENERATE_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
        }
    }
}

pub struct OllamaAdapter {
    config: OllamaConfig,
    client: Client,
}

impl OllamaAdapter {
    pub fn new(config: OllamaConfig) -> Result<Self, FundchatError> {
        let client = Client::builder()
            .build()
            .map_err(|e| FundchatError::ModelResponse {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_error(&self, url: &str, timeout_secs: u64, err: reqwest::Error) -> FundchatError {
        if err.is_timeout() {
            FundchatError::ModelTimeout { secs: timeout_secs }
        } else if err.is_connect() {
            FundchatError::ModelUnavailable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            FundchatError::ModelResponse {
                reason: format!("request to {} failed: {}", url, err),
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Pull the generated text out of an `/api/generate` reply body.
pub fn parse_generate_body(body: &str) -> Result<String, FundchatError> {
    serde_json::from_str::<GenerateResponse>(body)
        .map(|r| r.response)
        .map_err(|e| FundchatError::ModelResponse {
            reason: format!("invalid model response: {}", e),
        })
}

impl ModelPort for OllamaAdapter {
    fn generate(&self, prompt: &str) -> Result<String, FundchatError> {
        let url = self.url("api/generate");
        let secs = self.config.generate_timeout_secs;
        debug!(url = %url, model = %self.config.model, "generate request");

        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(secs))
            .json(&GenerateRequest {
                model: &self.config.model,
                prompt,
                stream: false,
            })
            .send()
            .map_err(|e| self.map_error(&url, secs, e))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| self.map_error(&url, secs, e))?;
        if !status.is_success() {
            return Err(FundchatError::ModelResponse {
                reason: format!("model returned {}: {}", status.as_u16(), body.trim()),
            });
        }
        parse_generate_body(&body)
    }

    fn check_available(&self) -> Result<(), FundchatError> {
        let url = self.url("api/tags");
        let secs = self.config.health_timeout_secs;
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(secs))
            .send()
            .map_err(|e| FundchatError::ModelUnavailable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(FundchatError::ModelUnavailable {
                url,
                reason: format!("status {}", resp.status().as_u16()),
            })
        }
    }
}
