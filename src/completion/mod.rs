//! Objective-summary completion
//!
//! - `prompt`: the single request builder shared by every call path
//! - `client`: OpenAI-compatible chat-completions client (trusted side only)
//! - `proxy`: client for the server's `/api/core-objective` route
//!
//! The journal only sees the [`ObjectiveSource`] trait.

pub mod prompt;
pub mod client;
pub mod proxy;

use async_trait::async_trait;
use tracing::warn;

use crate::config::Config;
use crate::types::LessonMeta;

pub use client::{CompletionClient, ProviderConfig};
pub use prompt::{objective_request, ObjectiveRequest, OBJECTIVE_SYSTEM_PROMPT};
pub use proxy::ProxyClient;

/// Why a completion did not produce text
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Malformed(String),
    #[error("completion provider not configured: {0}")]
    NotConfigured(String),
}

impl CompletionError {
    /// HTTP status returned by the remote side, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            CompletionError::Status { status, .. } => Some(*status),
            CompletionError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Something that turns lesson context into objective-only text
#[async_trait]
pub trait ObjectiveSource: Send + Sync {
    async fn objective(&self, context: &str, meta: &LessonMeta) -> Result<String, CompletionError>;
}

/// Stands in for a provider that could not be set up, so the journal still
/// runs its precondition check and falls back locally
#[derive(Debug, Clone)]
pub struct UnconfiguredSource {
    reason: String,
}

impl UnconfiguredSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl ObjectiveSource for UnconfiguredSource {
    async fn objective(&self, _context: &str, _meta: &LessonMeta) -> Result<String, CompletionError> {
        Err(CompletionError::NotConfigured(self.reason.clone()))
    }
}

/// Source for the CLI: the proxy by default, the provider itself with `direct`.
/// Setup failures are deferred to the request so they end in the fallback.
pub fn objective_source(config: &Config, direct: bool) -> Box<dyn ObjectiveSource> {
    let built = if direct {
        CompletionClient::from_config(config).map(|c| Box::new(c) as Box<dyn ObjectiveSource>)
    } else {
        ProxyClient::from_config(config).map(|c| Box::new(c) as Box<dyn ObjectiveSource>)
    };
    match built {
        Ok(source) => source,
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(direct, %reason, "Objective source unavailable");
            Box::new(UnconfiguredSource::new(reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> LessonMeta {
        LessonMeta {
            project_id: "policy-lab".to_string(),
            lesson_id: "pl-1".to_string(),
            lesson_title: "The Current Rulebook".to_string(),
            category: "Ethics & Advocacy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_source_reports_reason() {
        let source = UnconfiguredSource::new("no API key");
        let err = source.objective("ctx", &meta()).await.unwrap_err();
        assert!(matches!(&err, CompletionError::NotConfigured(r) if r == "no API key"));
        assert_eq!(err.status(), None);
    }
}
