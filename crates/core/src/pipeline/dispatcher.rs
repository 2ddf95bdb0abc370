//! Concurrent fan-out of a proposal request to every provider.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::provider::{MoveProvider, ProposalRequest, ProviderError, ProviderReply};

/// A provider task that finished before the deadline.
#[derive(Debug)]
pub struct ProviderOutcome {
    pub index: usize,
    pub provider: String,
    pub reply: Result<ProviderReply, ProviderError>,
    pub elapsed: Duration,
    finished_at: Instant,
}

/// Launches one task per provider under a shared deadline.
pub struct Dispatcher {
    providers: Vec<Arc<dyn MoveProvider>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(providers: Vec<Arc<dyn MoveProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Start every provider now. The deadline runs from this call.
    pub fn launch(&self, request: Arc<ProposalRequest>) -> Dispatch {
        let deadline = Instant::now() + self.timeout;
        let mut set = JoinSet::new();
        let mut names = Vec::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let request = Arc::clone(&request);
            let name = provider.name().to_string();
            names.push(name.clone());

            set.spawn(async move {
                let started = Instant::now();
                let reply = AssertUnwindSafe(provider.propose(&request))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(ProviderError::Failed("provider task panicked".to_string()))
                    });
                let finished_at = Instant::now();
                ProviderOutcome {
                    index,
                    provider: name,
                    reply,
                    elapsed: finished_at - started,
                    finished_at,
                }
            });
        }

        debug!(providers = names.len(), timeout = ?self.timeout, "Dispatched proposal request");
        Dispatch {
            set,
            deadline,
            outstanding: vec![true; names.len()],
            names,
        }
    }
}

/// In-flight provider calls of one turn. Dropping it cancels them.
pub struct Dispatch {
    set: JoinSet<ProviderOutcome>,
    deadline: Instant,
    outstanding: Vec<bool>,
    names: Vec<String>,
}

impl Dispatch {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Next provider to finish, in completion order. `None` once every
    /// provider has finished or the deadline has passed.
    pub async fn next(&mut self) -> Option<ProviderOutcome> {
        loop {
            if self.set.is_empty() {
                return None;
            }
            match tokio::time::timeout_at(self.deadline, self.set.join_next()).await {
                Ok(Some(Ok(outcome))) => {
                    // Answers polled after the deadline count as late.
                    if outcome.finished_at > self.deadline {
                        continue;
                    }
                    self.outstanding[outcome.index] = false;
                    return Some(outcome);
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "Provider task ended abnormally");
                    continue;
                }
                Ok(None) => return None,
                Err(_) => return None,
            }
        }
    }

    /// Abort every task still running and return `(index, name)` of each.
    pub fn cancel_outstanding(&mut self) -> Vec<(usize, String)> {
        self.set.abort_all();
        let cancelled: Vec<(usize, String)> = self
            .outstanding
            .iter()
            .enumerate()
            .filter(|(_, pending)| **pending)
            .map(|(index, _)| (index, self.names[index].clone()))
            .collect();
        for (index, _) in &cancelled {
            self.outstanding[*index] = false;
        }
        cancelled
    }
}
