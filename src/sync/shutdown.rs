//! Signal-driven shutdown.
//!
//! SIGINT and SIGTERM (Ctrl+C elsewhere) cancel a shared token. The listener
//! runs as an ordinary task, so logging here is safe.

use std::io;

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Spawn a task that cancels `token` on the first termination signal.
///
/// The SIGTERM handler is installed before returning so that installation
/// errors surface to the caller.
pub fn spawn_signal_listener(token: CancellationToken) -> io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::pin!(terminate);

        let interrupted = tokio::select! {
            result = signal::ctrl_c() => result,
            _ = &mut terminate => Ok(()),
            _ = token.cancelled() => return,
        };

        if let Err(err) = interrupted {
            error!("Failed to listen for interrupt signal: {}", err);
            tokio::select! {
                _ = terminate => {}
                _ = token.cancelled() => return,
            }
        }

        info!("Received termination signal. Shutting down sync process...");
        token.cancel();
    }))
}
