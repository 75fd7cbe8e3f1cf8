//! Inference backend abstraction
//!
//! The backend takes one prompt and returns one completion. Its internals are
//! opaque; only the call contract lives here.

mod client;
mod error;
mod models;

pub use client::{extract_completion, HttpInferenceClient};
pub use error::{BackendError, BackendErrorKind};
pub use models::{all_models, default_model, find_model, ModelDef};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Request body: `{ "message": ..., "model"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(message: impl Into<String>, model: Option<String>) -> Self {
        Self {
            message: message.into(),
            model,
        }
    }
}

/// Common interface for inference backends
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Request a single completion for `request.message`
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;

    /// Where requests are sent, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: InferenceClient + ?Sized> InferenceClient for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        (**self).complete(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for inference clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: InferenceClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: InferenceClient> InferenceClient for LoggingClient<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(completion) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    model = request.model.as_deref().unwrap_or("default"),
                    duration_ms = %duration.as_millis(),
                    completion_chars = completion.chars().count(),
                    "Completion request succeeded"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    model = request.model.as_deref().unwrap_or("default"),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Completion request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
