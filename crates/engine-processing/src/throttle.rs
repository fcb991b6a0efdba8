use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Enforces a minimum gap between consecutive page requests.
#[derive(Debug)]
pub struct Throttle {
    min_gap: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last: None,
        }
    }

    /// Waits until `min_gap` has passed since the previous call, then marks
    /// the current instant. The first call returns immediately.
    ///
    /// Returns `false` if `cancel` fired while waiting.
    pub async fn wait(&mut self, cancel: &CancellationToken) -> bool {
        if let Some(last) = self.last {
            let ready_at = last + self.min_gap;
            if ready_at > Instant::now() {
                tokio::select! {
                    _ = cancel.cancelled() => return false,
                    _ = sleep_until(ready_at) => {}
                }
            }
        }
        self.last = Some(Instant::now());
        true
    }
}
