//! Completion client for OpenAI-compatible providers

use anyhow::{Result, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompt::{objective_request, EMPTY_OUTPUT_MESSAGE};
use super::{CompletionError, ObjectiveSource};
use crate::config::CompletionConfig;
use crate::types::LessonMeta;

// ============ Provider Configuration ============

/// Configuration for a completion API provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Extra headers to include in requests
    pub extra_headers: Vec<(String, String)>,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((key.into(), value.into()));
        self
    }
}

/// Chat-completions client. Holds the provider key, so it only runs on
/// the trusted side of the proxy.
#[derive(Clone)]
pub struct CompletionClient {
    client: Arc<Client>,
    provider: ProviderConfig,
    settings: CompletionConfig,
}

impl CompletionClient {
    /// Create a client for a provider with the given request settings
    pub fn new(provider: ProviderConfig, settings: CompletionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client: Arc::new(client),
            provider,
            settings,
        })
    }

    /// Create client from config, with the key from env or keyring
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let api_key = crate::security::get_api_key()?;
        let provider = ProviderConfig::new(config.completion.base_url.clone(), api_key);
        Self::new(provider, config.completion.clone())
    }

    /// Get the provider configuration
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Run an objective completion for the given context
    pub async fn complete_objective(&self, context: &str) -> Result<String, CompletionError> {
        let request = objective_request(context, &self.settings);

        let mut req_builder = self.client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .bearer_auth(&self.provider.api_key);
        for (key, value) in &self.provider.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        debug!(model = %request.model, "Sending objective completion request");
        let response = req_builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Completion provider returned an error");
            return Err(CompletionError::Status { status, body });
        }

        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(format!("{} (body: {})", e, crate::truncate_safe(&body, 200))))?;

        let text = extract_text(&raw)
            .ok_or_else(|| CompletionError::Malformed("response has no choices".to_string()))?;

        let text = text.trim();
        if text.is_empty() {
            Ok(EMPTY_OUTPUT_MESSAGE.to_string())
        } else {
            Ok(text.to_string())
        }
    }
}

#[async_trait]
impl ObjectiveSource for CompletionClient {
    async fn objective(&self, context: &str, _meta: &LessonMeta) -> Result<String, CompletionError> {
        self.complete_objective(context).await
    }
}

/// Pull `choices[0].message.content` out of a response, handling both
/// string content and array-of-content-parts formats.
fn extract_text(raw: &Value) -> Option<String> {
    let message = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))?;

    let text = match message.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| {
                if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                    part.get("text").and_then(|t| t.as_str()).map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };
    Some(text)
}
