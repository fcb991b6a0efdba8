use crate::error::RuntimeError;
use engine_config::report::summary::{RunOutcome, RunSummary};
use engine_core::metrics::{CrawlMetrics, MetricsSnapshot};
use engine_processing::{crawl::CrawlEngine, error::CrawlError};
use model::records::DomainRecord;
use serde::Serialize;
use std::{fmt, sync::Arc};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    /// Cancellation requested; the current page is still being applied.
    Cancelling,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Running => "running",
            RunState::Cancelling => "cancelling",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub state: RunState,
    pub metrics: MetricsSnapshot,
}

/// Caller-owned handle on one crawl run spawned onto the tokio runtime.
///
/// Cancellation is cooperative: [`RunHandle::request_cancel`] only asks the
/// engine to stop at the next page boundary.
pub struct RunHandle {
    join: JoinHandle<Result<RunSummary, CrawlError>>,
    cancel: CancellationToken,
    metrics: CrawlMetrics,
    state: Arc<watch::Sender<RunState>>,
}

impl RunHandle {
    pub fn start<R: DomainRecord>(engine: CrawlEngine<R>) -> Self {
        let cancel = engine.cancel_token();
        let metrics = engine.metrics();
        let (state_tx, _) = watch::channel(RunState::Running);
        let state = Arc::new(state_tx);

        let task_state = state.clone();
        let join = tokio::spawn(async move {
            let result = engine.run().await;
            let final_state = match &result {
                Ok(summary) if summary.outcome == RunOutcome::Completed => RunState::Completed,
                Ok(_) => RunState::Cancelled,
                Err(_) => RunState::Failed,
            };
            task_state.send_replace(final_state);
            result
        });

        Self {
            join,
            cancel,
            metrics,
            state,
        }
    }

    /// Asks the run to stop after the page in flight. No effect once the run
    /// has finished.
    pub fn request_cancel(&self) {
        let requested = self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                *state = RunState::Cancelling;
                true
            } else {
                false
            }
        });
        if requested {
            info!("Cancellation requested, finishing current page");
            self.cancel.cancel();
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            state: *self.state.borrow(),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Resolves once the run reaches a terminal state.
    pub async fn finished(&self) -> RunState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(RunState::is_terminal).await {
            Ok(state) => *state,
            Err(_) => *self.state.borrow(),
        }
    }

    /// Waits for the run and returns its summary.
    pub async fn wait(self) -> Result<RunSummary, RuntimeError> {
        Ok(self.join.await??)
    }
}
