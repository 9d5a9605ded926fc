//! Shutdown signalling.
//!
//! A [`Shutdown`] token is handed to the accept loop; the matching
//! [`ShutdownTrigger`] is held by whoever decides the server should stop,
//! normally the signal bridge started by [`spawn_signal_bridge`].

use tokio::sync::watch;
use tracing::{error, info};

/// Sending half: flips the token once.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half, polled by the accept loop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger/token pair.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // send_replace succeeds even with no receivers left.
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested.
    ///
    /// A dropped trigger counts as a shutdown request.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// Flip `trigger` on SIGINT (Ctrl+C) or, on unix, SIGTERM.
pub fn spawn_signal_bridge(trigger: ShutdownTrigger) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    })
}

async fn wait_for_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("SIGINT received, shutting down server"),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("SIGTERM received, shutting down server");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger() {
        let (trigger, mut shutdown) = channel();
        assert!(!shutdown.is_shutdown());

        trigger.trigger();
        assert!(shutdown.is_shutdown());
        shutdown.recv().await;
    }

    #[tokio::test]
    async fn test_clones_observe_trigger() {
        let (trigger, shutdown) = channel();
        let mut other = shutdown.clone();

        let waiter = tokio::spawn(async move {
            other.recv().await;
        });
        trigger.trigger();
        waiter.await.unwrap();
        assert!(shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn test_dropped_trigger_resolves() {
        let (trigger, mut shutdown) = channel();
        drop(trigger);
        shutdown.recv().await;
    }
}
