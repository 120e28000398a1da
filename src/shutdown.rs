use tracing::{debug, warn};

use crate::dispatch::DispatcherHandle;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels the run on Ctrl+C (and SIGTERM on unix). The task exits on its
/// own once the run reaches a terminal state.
pub fn setup_signal_shutdown_handler(handle: DispatcherHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = handle.finished() => {
                    debug!("Run finished; signal handler exiting");
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupt received, cancelling load test");
                    handle.cancel();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    warn!("SIGTERM received, cancelling load test");
                    handle.cancel();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = handle.finished() => {
                    debug!("Run finished; signal handler exiting");
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupt received, cancelling load test");
                    handle.cancel();
                }
            }
        }
    })
}
