//! Mock remote dictionary for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::adjudicator::{RemoteDictionary, RemoteLookupError};
use crate::text::normalize_word;

/// A recorded lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLookup {
    pub word: String,
    pub timeout: Duration,
}

/// Mock implementation of the RemoteDictionary trait.
///
/// Unknown words are reported as not found. Lookups are recorded before any
/// delay or scripted failure, so timed-out attempts show up too.
#[derive(Debug, Default)]
pub struct MockRemoteDictionary {
    verdicts: Arc<RwLock<HashMap<String, bool>>>,
    failures_left: Arc<RwLock<usize>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<RecordedLookup>>>,
}

impl MockRemoteDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_found(&self, word: &str, found: bool) {
        self.verdicts
            .write()
            .await
            .insert(normalize_word(word), found);
    }

    /// Fail the next `n` lookups with a transient error.
    pub async fn fail_next(&self, n: usize) {
        *self.failures_left.write().await = n;
    }

    /// Delay every lookup.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn calls(&self) -> Vec<RecordedLookup> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl RemoteDictionary for MockRemoteDictionary {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(&self, word: &str, timeout: Duration) -> Result<bool, RemoteLookupError> {
        self.calls.write().await.push(RecordedLookup {
            word: word.to_string(),
            timeout,
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut failures = self.failures_left.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(RemoteLookupError::Http("simulated failure".to_string()));
            }
        }

        Ok(self
            .verdicts
            .read()
            .await
            .get(&normalize_word(word))
            .copied()
            .unwrap_or(false))
    }
}
