use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fedq_result::{Error, Result};

/// Per-query context threaded through compilation and execution.
///
/// Operators never inspect it beyond [`QueryContext::check`]; it is cloned and
/// forwarded unchanged to every Materialize call and every external
/// collaborator. Clones share one cancellation flag.
#[derive(Clone)]
pub struct QueryContext {
    label: Arc<str>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("label", &self.label)
            .field("deadline", &self.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryContext {
    /// Construct an unlabelled context with no deadline.
    pub fn new() -> Self {
        Self::begin("query")
    }

    /// Construct a context tagged with `label` for diagnostics.
    pub fn begin(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with [`Error::Cancelled`] once the context was cancelled or its
    /// deadline elapsed.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            tracing::debug!(label = %self.label, "query context cancelled");
            return Err(Error::Cancelled(format!("{} was cancelled", self.label)));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            tracing::debug!(label = %self.label, "query context deadline elapsed");
            return Err(Error::Cancelled(format!(
                "{} exceeded its deadline",
                self.label
            )));
        }
        Ok(())
    }
}
