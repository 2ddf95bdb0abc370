//! Mock move provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::provider::{LlmUsage, MoveProvider, ProposalRequest, ProviderError, ProviderReply};

/// Scripted provider: answers with fixed text after an optional delay, or
/// fails.
///
/// # Example
///
/// ```rust,ignore
/// use tilerace_core::testing::{MockProvider, fixtures};
///
/// let slow = MockProvider::new("slow")
///     .with_response(fixtures::move_json(&[(7, 7, "C"), (7, 8, "A"), (7, 9, "T")]))
///     .with_delay(Duration::from_secs(30));
/// let broken = MockProvider::new("broken").failing("connection refused");
/// ```
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    response: String,
    delay: Option<Duration>,
    error: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: String::new(),
            delay: None,
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response = text.into();
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with a transport-style failure.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Number of `propose` calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoveProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&self, _request: &ProposalRequest) -> Result<ProviderReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.error {
            return Err(ProviderError::Failed(message.clone()));
        }
        Ok(ProviderReply {
            text: self.response.clone(),
            usage: Some(LlmUsage::default()),
            model: Some("mock".to_string()),
        })
    }
}
