//! Signal handling for graceful shutdown
//!
//! A Ctrl-C or SIGTERM is broadcast to the download manager, which stops
//! before the next item once the current one has been persisted.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// Signal handler for graceful shutdown coordination
pub struct SignalHandler {
    shutdown_tx: broadcast::Sender<()>,
}

impl SignalHandler {
    /// Create a new signal handler with the given shutdown broadcaster
    pub fn new(shutdown_tx: broadcast::Sender<()>) -> Self {
        Self { shutdown_tx }
    }

    /// Setup signal handling for graceful shutdown (CTRL-C, SIGTERM)
    ///
    /// Returns a handle to the background task that monitors for signals.
    pub fn setup(&self) -> JoinHandle<()> {
        let shutdown_tx = self.shutdown_tx.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to install Ctrl+C handler: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, finishing current item before stopping");
                },
                _ = terminate => {
                    info!("Received terminate signal, finishing current item before stopping");
                },
            }

            let _ = shutdown_tx.send(());
        })
    }
}

/// Create a shutdown signal broadcaster
pub fn create_shutdown_channel() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
    broadcast::channel(1)
}

/// Latching view of the shutdown channel
///
/// Once a shutdown is observed it stays observed. A closed channel means no
/// shutdown can arrive any more, so it is treated as "never".
#[derive(Debug)]
pub struct ShutdownListener {
    rx: Option<broadcast::Receiver<()>>,
    triggered: bool,
}

impl ShutdownListener {
    /// Listen on `rx`
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self {
            rx: Some(rx),
            triggered: false,
        }
    }

    /// Listener that never fires
    pub fn disabled() -> Self {
        Self {
            rx: None,
            triggered: false,
        }
    }

    /// Non-blocking check for a pending shutdown request
    pub fn is_triggered(&mut self) -> bool {
        if self.triggered {
            return true;
        }

        if let Some(rx) = self.rx.as_mut() {
            match rx.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => self.triggered = true,
                Err(TryRecvError::Closed) => self.rx = None,
                Err(TryRecvError::Empty) => {}
            }
        }

        self.triggered
    }

    /// Sleep for `duration`, waking early on shutdown
    ///
    /// Returns `true` if shutdown was requested before the sleep finished.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }

        let deadline = Instant::now() + duration;
        loop {
            let received = match self.rx.as_mut() {
                None => {
                    tokio::time::sleep_until(deadline).await;
                    return false;
                }
                Some(rx) => tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => return false,
                    received = rx.recv() => received,
                },
            };

            match received {
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    self.triggered = true;
                    return true;
                }
                Err(RecvError::Closed) => self.rx = None,
            }
        }
    }
}
