//! Single in-flight refresh for one client session.
//!
//! Every request records the gate generation before it is sent. A request
//! that comes back 401 calls `refresh_once` with that generation: if a
//! refresh already completed after the request was sent, its outcome is
//! reused; otherwise the caller runs the refresh while holding the gate, so
//! concurrent callers queue behind it and then reuse its outcome.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Result of one refresh attempt, shared with every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed(String),
}

/// The generation is bumped only once a refresh has finished, so a caller
/// that reads it while a refresh is running queues behind that refresh.
#[derive(Debug, Default)]
pub struct RefreshGate {
    generation: AtomicU64,
    last: Mutex<Option<RefreshOutcome>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation; capture it before sending a request.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Run `refresh` unless a refresh finished after `observed`.
    pub async fn refresh_once<F, Fut>(&self, observed: u64, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        let mut last = self.last.lock().await;
        if self.generation() != observed
            && let Some(outcome) = last.as_ref()
        {
            tracing::debug!(generation = self.generation(), "reusing completed refresh");
            return outcome.clone();
        }

        let outcome = refresh().await;
        *last = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Forget the last outcome once a new session is established, so requests
    /// sent under the old one refresh against the new cookies.
    pub async fn reset(&self) {
        let mut last = self.last.lock().await;
        *last = None;
        self.generation.fetch_add(1, Ordering::Release);
    }
}
