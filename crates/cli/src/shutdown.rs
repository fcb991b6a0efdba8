use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Listens for SIGINT and SIGTERM and turns the first one into a
/// cancellation of the running crawl.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The first signal cancels the crawl, which stops after the page in
    /// flight. A second signal exits immediately with code 130.
    pub fn register_handlers(&self) {
        let cancel_token = self.cancel_token.clone();
        let shutdown_flag = self.shutdown_requested.clone();

        tokio::spawn(async move {
            let Some(name) = next_signal().await else {
                return;
            };
            info!(signal = name, "Finishing current page before exit, signal again to abort");
            shutdown_flag.store(true, Ordering::SeqCst);
            cancel_token.cancel();

            if let Some(name) = next_signal().await {
                warn!(signal = name, "Second signal received, aborting without waiting");
                std::process::exit(ExitCode::ShutdownRequested.as_i32());
            }
        });
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }
}

/// Exit codes for the CLI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    ShutdownRequested = 130, // Standard exit code for SIGINT
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Resolves with the name of the next SIGINT or SIGTERM. `None` when no
/// handler could be installed.
async fn next_signal() -> Option<&'static str> {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => Some("SIGINT"),
            Err(e) => {
                error!(error = %e, "Failed to install SIGINT handler");
                None
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => sig.recv().await.map(|_| "SIGTERM"),
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<&'static str>>();

    tokio::select! {
        Some(name) = ctrl_c => Some(name),
        Some(name) = terminate => Some(name),
        else => None,
    }
}
