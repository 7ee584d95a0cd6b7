//! Cancellation for running campaigns.
//!
//! A [`CancelSignal`] is shared between the campaign loop and whoever may stop it (the interrupt
//! listener in the binary, a test). The loop checks it before each run and races it against the
//! inter-run wait; a run already in progress is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Cloneable, one-shot cancellation flag.
#[derive(Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Later calls are no-ops.
    pub fn cancel(&self) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Cancellation requested");
            let _ = self.tx.send(true);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                // Sender dropped: never cancelled.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if cancelled.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.cancelled() => false,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancel `signal` on Ctrl-C (and SIGTERM on unix). Runs until one arrives.
#[cfg(unix)]
pub async fn listen_for_interrupt(signal: CancelSignal) {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut sigterm = match unix_signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C");
                signal.cancel();
            }
            return;
        }
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if res.is_err() {
                return;
            }
            info!("Received Ctrl-C");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
    }

    signal.cancel();
}

/// Cancel `signal` on Ctrl-C. Runs until it arrives.
#[cfg(not(unix))]
pub async fn listen_for_interrupt(signal: CancelSignal) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C");
        signal.cancel();
    }
}
