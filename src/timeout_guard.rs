use std::future::Future;

use log::{info, warn};
use tokio::time::{self, Instant};

use crate::{config::GuardBudget, error::PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    Request,
    Storage,
}

impl GuardKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Storage => "storage",
        }
    }

    fn timeout_error(self) -> PipelineError {
        match self {
            Self::Request => PipelineError::RequestTimeout,
            Self::Storage => PipelineError::StorageTimeout,
        }
    }
}

/// Admission check racing a reference duration against a deadline.
///
/// `run_bounded` does not watch any real operation: it succeeds when the
/// reference duration elapses first and fails with the kind's timeout error
/// when the deadline fires first. When both are equal the reference timer is
/// registered first and wins. Dropping the returned future (request
/// cancellation) abandons the race without reporting either outcome.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    kind: GuardKind,
    budget: GuardBudget,
}

impl TimeoutGuard {
    pub fn new(kind: GuardKind, budget: GuardBudget) -> Self {
        Self { kind, budget }
    }

    pub async fn run_bounded(&self) -> Result<(), PipelineError> {
        self.bound(time::sleep(self.budget.reference)).await
    }

    /// Races `work` against the guard's deadline.
    pub async fn bound<F: Future>(&self, work: F) -> Result<F::Output, PipelineError> {
        let _span = GuardSpan::start(self);

        match time::timeout(self.budget.deadline, work).await {
            Ok(output) => {
                info!("guard={} event=ok", self.kind.label());
                Ok(output)
            }
            Err(_) => {
                warn!(
                    "guard={} event=timeout deadline_ms={}",
                    self.kind.label(),
                    self.budget.deadline.as_millis()
                );
                Err(self.kind.timeout_error())
            }
        }
    }
}

/// Logs the end event on every exit, cancellation included.
struct GuardSpan {
    kind: GuardKind,
    started: Instant,
}

impl GuardSpan {
    fn start(guard: &TimeoutGuard) -> Self {
        info!(
            "guard={} event=started deadline_ms={} reference_ms={}",
            guard.kind.label(),
            guard.budget.deadline.as_millis(),
            guard.budget.reference.as_millis()
        );
        Self {
            kind: guard.kind,
            started: Instant::now(),
        }
    }
}

impl Drop for GuardSpan {
    fn drop(&mut self) {
        info!(
            "guard={} event=ended elapsed_ms={}",
            self.kind.label(),
            self.started.elapsed().as_millis()
        );
    }
}
