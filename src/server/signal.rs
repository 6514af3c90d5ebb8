// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::logger;

/// Shutdown coordination shared by every server in the process
#[derive(Debug, Default)]
pub struct SignalHandler {
    shutdown: Notify,
    shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every server waiting on [`Self::wait_for_shutdown`] to stop
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Future resolving once shutdown has been requested, including
    /// requests made before the future was first polled.
    pub fn wait_for_shutdown(self: &Arc<Self>) -> impl Future<Output = ()> + Send + 'static {
        let handler = Arc::clone(self);
        async move {
            let notified = handler.shutdown.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if handler.is_shutdown_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// Start signal handlers (Unix: SIGTERM and SIGINT)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => logger::log_signal("SIGTERM"),
            _ = sigint.recv() => logger::log_signal("SIGINT"),
        }
        handler.request_shutdown();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_signal("Ctrl+C");
            handler.request_shutdown();
        }
    });
}
