//! Client for the objective proxy route
//!
//! This is the path every untrusted client takes: it sends the raw
//! context to the server, which holds the provider key.

use anyhow::{Result, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompt::EMPTY_OUTPUT_MESSAGE;
use super::{CompletionError, ObjectiveSource};
use crate::types::LessonMeta;

/// Body of `POST /api/core-objective`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveProxyRequest {
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<LessonMeta>,
}

#[derive(Debug, Deserialize)]
struct ProxyReply {
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::new(
            config.proxy.url.clone(),
            Duration::from_secs(config.completion.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ObjectiveSource for ProxyClient {
    async fn objective(&self, context: &str, meta: &LessonMeta) -> Result<String, CompletionError> {
        let body = ObjectiveProxyRequest {
            context: context.to_string(),
            meta: Some(meta.clone()),
        };

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<ProxyReply>(&text)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(text);
            return Err(CompletionError::Status { status: status.as_u16(), body });
        }

        let reply: ProxyReply = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;
        let output = reply
            .output
            .ok_or_else(|| CompletionError::Malformed("proxy reply has no 'output'".to_string()))?;
        match output.trim() {
            "" => Ok(EMPTY_OUTPUT_MESSAGE.to_string()),
            trimmed => Ok(trimmed.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn meta() -> LessonMeta {
        LessonMeta {
            project_id: "deepfake-detective".to_string(),
            lesson_id: "dd-1".to_string(),
            lesson_title: "What Makes Media Synthetic".to_string(),
            category: "Media Literacy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_proxy_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/core-objective"))
            .and(body_partial_json(serde_json::json!({
                "context": "AI deepfakes in elections",
                "meta": {"projectId": "deepfake-detective", "lessonId": "dd-1"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "output": "- Synthetic video was used in campaigns."
            })))
            .mount(&server)
            .await;

        let client = ProxyClient::new(format!("{}/api/core-objective", server.uri()), Duration::from_secs(5)).unwrap();
        let text = client.objective("AI deepfakes in elections", &meta()).await.unwrap();
        assert_eq!(text, "- Synthetic video was used in campaigns.");
    }

    #[tokio::test]
    async fn test_proxy_server_error_carries_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Server error while generating objective output."
            })))
            .mount(&server)
            .await;

        let client = ProxyClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.objective("ctx", &meta()).await.unwrap_err();
        match err {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Server error while generating objective output.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_proxy_blank_output_gets_placeholder() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "output": " \n " })))
            .mount(&server)
            .await;

        let client = ProxyClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let text = client.objective("ctx", &meta()).await.unwrap();
        assert_eq!(text, EMPTY_OUTPUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_proxy_reply_without_output() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = ProxyClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.objective("ctx", &meta()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_proxy_unreachable() {
        // Nothing listens on port 9 locally
        let client = ProxyClient::new("http://127.0.0.1:9/api/core-objective", Duration::from_secs(2)).unwrap();
        let err = client.objective("ctx", &meta()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
    }
}
