//! HTTP client for the inference backend

use super::{BackendError, CompletionRequest, InferenceClient};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Field names the completion has been observed under, in lookup order
const COMPLETION_FIELDS: &[&str] = &["response", "ai_response"];

/// Extract completion text from a backend response body.
///
/// Missing, non-string, and whitespace-only values all count as absent.
pub fn extract_completion(body: &Value) -> Option<String> {
    COMPLETION_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Posts `{ message, model? }` as JSON to a fixed endpoint
pub struct HttpInferenceClient {
    client: Client,
    endpoint: String,
}

impl HttpInferenceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    BackendError::network(format!("Connection failed: {e}"))
                } else {
                    BackendError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::timeout(format!("Timed out reading response: {e}"))
            } else {
                BackendError::network(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(BackendError::status(
                status.as_u16(),
                format!("HTTP {status}: {body}"),
            ));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            BackendError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        extract_completion(&value).ok_or_else(BackendError::empty_completion)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
