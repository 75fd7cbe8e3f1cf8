//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real backend.

use crate::backend::{BackendError, CompletionRequest, InferenceClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Inference Client
// ============================================================================

/// Mock client that returns queued results
pub struct MockInferenceClient {
    results: Mutex<VecDeque<Result<String, BackendError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion
    pub fn queue_completion(&self, text: impl Into<String>) {
        self.results.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error
    pub fn queue_error(&self, error: BackendError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_result(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("No mock result queued")))
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.next_result(request)
    }

    fn endpoint(&self) -> &str {
        "mock://backend"
    }
}

// ============================================================================
// Delayed Mock Client (for in-flight and cancellation testing)
// ============================================================================

/// Mock client with configurable delay
pub struct DelayedMockClient {
    inner: MockInferenceClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

#[allow(dead_code)]
impl DelayedMockClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockInferenceClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_completion(&self, text: impl Into<String>) {
        self.inner.queue_completion(text);
    }

    pub fn queue_error(&self, error: BackendError) {
        self.inner.queue_error(error);
    }

    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl InferenceClient for DelayedMockClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_result(request)
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
