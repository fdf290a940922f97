//! Mock completion client for testing.
//!
//! Returns queued replies or errors in order, then falls back to a default
//! reply whose continuation token counts calls (`mock-1`, `mock-2`, ...).
//!
//! # Example
//!
//! ```ignore
//! let client = MockCompletionClient::new()
//!     .with_reply("Made it blue", "resp-1")
//!     .with_error(CompletionError::rate_limited(5));
//!
//! let reply = client.complete(request).await?;
//! assert_eq!(reply.text, "Made it blue");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CompletionClient, CompletionError, CompletionReply, CompletionRequest};

/// Mock completion client.
///
/// Clones share the queue and the call history.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionClient {
    responses: Arc<Mutex<VecDeque<Result<CompletionReply, CompletionError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn with_reply(self, text: impl Into<String>, continuation: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(CompletionReply::new(text, continuation)));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: CompletionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(CompletionReply::new(
                format!("Mock reply to: {}", request.text),
                format!("mock-{}", call_number),
            ))
        })
    }
}
