use core_types::QuoteError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation shared by every quote call of one intent generation.
///
/// Cloning is cheap; all clones observe the same flag. Cancelling never aborts
/// a network call already in flight, it only suppresses what comes after it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Returns `Err(QuoteError::Cancelled)` once cancelled. Call between suspension points.
    pub fn check(&self) -> Result<(), QuoteError> {
        if self.is_cancelled() { Err(QuoteError::Cancelled) } else { Ok(()) }
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as any clone of the token, so this only
        // returns once the flag flips.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `fut` to completion unless the token is cancelled first.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
