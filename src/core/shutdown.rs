use std::future::Future;

use tokio::signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "ctrl_c",
            ShutdownSignal::Terminate => "sigterm",
        }
    }
}

/// Future handed to `with_graceful_shutdown`. Resolves once the process is
/// asked to stop; in-flight uploads and gradings are then drained.
pub(crate) async fn shutdown_signal() {
    let received = wait_for_signal().await;
    tracing::info!(signal = received.as_str(), "Quiz grader stopping; draining in-flight requests");
}

async fn wait_for_signal() -> ShutdownSignal {
    let interrupt = installed("Ctrl+C", signal::ctrl_c());

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    }
}

// A handler that fails to install never fires.
async fn installed<F>(name: &'static str, handler: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = handler.await {
        tracing::error!(handler = name, error = %err, "Failed to install signal handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn signals_have_log_labels() {
        assert_eq!(ShutdownSignal::Interrupt.as_str(), "ctrl_c");
        assert_eq!(ShutdownSignal::Terminate.as_str(), "sigterm");
    }

    #[tokio::test]
    async fn failed_handler_never_resolves() {
        let failing = installed("test", async { Err(std::io::Error::other("unsupported")) });
        let outcome = tokio::time::timeout(Duration::from_millis(20), failing).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn installed_handler_resolves_when_fired() {
        let fired = installed("test", async { Ok(()) });
        tokio::time::timeout(Duration::from_millis(20), fired).await.expect("resolves");
    }
}
