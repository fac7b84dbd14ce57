use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;

/// Cooperative cancellation for one trial's deadline. Every suspension
/// point (LLM call, tool call, MCP round-trip) races its future against
/// [`CooperativeCancellationToken::cancelled`] rather than being hard-
/// aborted, so in-flight state (a spawned MCP child, an open scratch
/// directory) is always torn down by the code that owns it.
#[derive(Clone)]
pub struct CooperativeCancellationToken {
    fired: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CooperativeCancellationToken {
    pub fn new() -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Spawns a background timer that fires the token after `timeout`
    /// elapses, unless the returned guard is dropped first.
    pub fn with_deadline(timeout: Duration) -> (Self, tokio::task::JoinHandle<()>) {
        let token = Self::new();
        let timer_token = token.clone();
        let handle = tokio::spawn(async move {
            sleep(timeout).await;
            timer_token.cancel();
        });
        (token, handle)
    }

    pub fn is_cancelled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Resolves once [`Self::cancel`] has been called. Resolves
    /// immediately if it already has been, so callers can freely
    /// `select!` against this in a loop without missing a firing that
    /// happened between iterations.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for CooperativeCancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancelled_resolves_immediately_if_already_fired() {
        let token = CooperativeCancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("should not block once already cancelled");
    }

    #[tokio::test]
    async fn with_deadline_fires_after_the_configured_timeout() {
        let (token, handle) = CooperativeCancellationToken::with_deadline(Duration::from_millis(20));
        assert!(!token.is_cancelled());
        token.cancelled().await;
        assert!(token.is_cancelled());
        handle.await.unwrap();
    }
}
