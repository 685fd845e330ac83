use aquila::{
    Error, Result,
    ai::{CompletionBackend, CompletionRequest},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Completion backend that replays queued answers and records every request.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub responses: Arc<Mutex<Vec<String>>>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
    pub error: Option<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.responses.lock().unwrap() = responses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn get_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.get_requests()
            .pop()
            .expect("backend was never called")
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::provider(error.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::provider("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

/// Forwards to a shared [`MockBackend`] so a test keeps a handle for inspection.
pub struct SharedBackend(pub Arc<MockBackend>);

#[async_trait]
impl CompletionBackend for SharedBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.0.complete(request).await
    }
}
