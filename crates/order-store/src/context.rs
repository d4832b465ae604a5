//! Execution context passed to every store operation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Cancellation, OrderStoreError, Result};

/// Cancellation and deadline scope for a single caller request.
///
/// The store only inspects a context before it starts work; once an
/// operation has entered its critical section it runs to completion.
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context driven by an externally owned token, e.g. a shutdown signal.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a context cancelled whenever this one is, keeping the deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a child context whose deadline is the earlier of the
    /// parent's and `now + timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context was cancelled or its deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(OrderStoreError::Cancelled(Cancellation::Cancelled));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(OrderStoreError::Cancelled(Cancellation::DeadlineExceeded));
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
