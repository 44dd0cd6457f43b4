//! Shutdown signal handling, adapted from the teacher's graceful-shutdown
//! idiom: waits for SIGTERM or SIGINT/Ctrl+C, then clears a shared
//! `running` flag so the pooler/scheduler run loops exit on their next
//! tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;

/// Spawns a task that waits for a shutdown signal, then clears `running`.
pub fn install(running: Arc<AtomicBool>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received, stopping run loops");
        running.store(false, Ordering::SeqCst);
    });
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(%err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
