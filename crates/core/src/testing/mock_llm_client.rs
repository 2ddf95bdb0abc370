//! Mock LLM client for testing.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::provider::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Client returning a fixed completion and recording every request.
pub struct MockLlmClient {
    response: String,
    error: Option<(u16, String)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call fails like `error`. Non-API errors are
    /// reported as status 500.
    pub fn failing(error: LlmError) -> Self {
        let error = match error {
            LlmError::Api { status, message } => (status, message),
            other => (500, other.to_string()),
        };
        Self {
            response: String::new(),
            error: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let input_tokens = request.prompt.len() as u32 / 4;
        self.requests.lock().await.push(request);
        if let Some((status, message)) = &self.error {
            return Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(CompletionResponse {
            text: self.response.clone(),
            usage: LlmUsage {
                input_tokens,
                output_tokens: self.response.len() as u32 / 4,
            },
            model: "mock-model".to_string(),
        })
    }
}
