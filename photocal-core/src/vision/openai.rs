//! OpenAI-compatible vision client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::protocol::{ChatRequest, ChatResponse, ErrorResponse};
use super::{Credential, VisionService};
use crate::error::{PhotocalError, PhotocalResult};

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: &str, timeout: Duration) -> PhotocalResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photocal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PhotocalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(OpenAiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl VisionService for OpenAiClient {
    async fn complete(
        &self,
        request: &ChatRequest,
        credential: &Credential,
    ) -> PhotocalResult<ChatResponse> {
        tracing::debug!(model = %request.model, url = %self.endpoint(), "sending vision request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PhotocalError::Timeout(self.timeout.as_secs())
                } else if e.is_connect() {
                    PhotocalError::Transport(format!("Connection failed: {}", e))
                } else {
                    PhotocalError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PhotocalError::Transport(format!("Failed to read response: {}", e)))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "vision response received");

        if !status.is_success() {
            return Err(upstream_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| PhotocalError::MalformedResponse(format!("Unexpected response body: {}", e)))
    }
}

/// Classify a non-success reply, surfacing the service's own message if any.
fn upstream_error(status: StatusCode, body: &str) -> PhotocalError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());

    PhotocalError::Upstream {
        status: status.as_u16(),
        message,
    }
}
