//! Per-run configuration and cancellation.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::domain::foundation::RunId;

/// How the orchestrator delivers steps.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Deliver each step's text character by character before the step.
    pub streaming: bool,
    /// Interval between characters when streaming.
    pub typing_delay: Duration,
    /// Upper bound on one agent call; `None` waits indefinitely.
    pub agent_timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            streaming: false,
            typing_delay: Duration::from_millis(20),
            agent_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RunConfig {
    /// Complete steps only.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Typed delivery at the given cadence.
    pub fn streamed(typing_delay: Duration) -> Self {
        Self {
            streaming: true,
            typing_delay,
            ..Self::default()
        }
    }

    pub fn with_agent_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.agent_timeout = timeout;
        self
    }
}

/// Cancellation side of a run. Cloneable; any clone cancels the run.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observing side of a run, handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: RunId,
    cancel: watch::Receiver<bool>,
}

impl RunContext {
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            run_id: RunId::new(),
            cancel: rx,
        };
        (ctx, CancelHandle { tx: Arc::new(tx) })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once the run is cancelled. Never resolves if every handle
    /// is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_to_context() {
        let (ctx, handle) = RunContext::new();
        assert!(!ctx.is_cancelled());
        handle.clone().cancel();
        assert!(ctx.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (ctx, handle) = RunContext::new();
        let waiter = tokio::spawn(async move { ctx.cancelled().await });
        handle.cancel();
        assert!(waiter.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_stays_pending_when_handle_dropped() {
        let (ctx, handle) = RunContext::new();
        drop(handle);
        let result = tokio::time::timeout(Duration::from_secs(5), ctx.cancelled()).await;
        assert!(result.is_err());
    }

    #[test]
    fn streamed_config_keeps_default_timeout() {
        let config = RunConfig::streamed(Duration::from_millis(5));
        assert!(config.streaming);
        assert_eq!(config.agent_timeout, Some(Duration::from_secs(30)));
    }
}
