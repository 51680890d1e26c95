//! Stops the HTTP server on termination signals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};

static RUNNING: AtomicBool = AtomicBool::new(true);

/// Call from within the tokio runtime, after the platform is ready.
pub fn install_termination_listener() {
    tokio::spawn(async move {
        let mut sig_term = signal(SignalKind::terminate()).ok();
        let mut sig_int = signal(SignalKind::interrupt()).ok();
        let mut sig_hup = signal(SignalKind::hangup()).ok();

        let name = tokio::select! {
            Some(_) = async { sig_int.as_mut()?.recv().await } => "SIGINT",
            Some(_) = async { sig_term.as_mut()?.recv().await } => "SIGTERM",
            Some(_) = async { sig_hup.as_mut()?.recv().await } => "SIGHUP",
            else => {
                tracing::warn!("Unable to listen for termination signals");
                return;
            }
        };

        tracing::info!("Received {}. Shutting down...", name);
        request_shutdown();
    });
}

pub fn request_shutdown() {
    RUNNING.store(false, Ordering::Relaxed);
}

pub fn is_running() -> bool {
    RUNNING.load(Ordering::Relaxed)
}

pub async fn await_shutdown() {
    while is_running() {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn await_shutdown_returns_after_request() {
        let waiter = tokio::spawn(await_shutdown());

        request_shutdown();

        tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("shutdown was not observed")
            .unwrap();
        assert!(!is_running());
    }
}
