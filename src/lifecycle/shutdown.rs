//! Shutdown coordination for the front end.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, watch};

use crate::net::{ListenerError, RunningListeners};

/// Slack allowed past the drain deadline before the join is abandoned.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle state of the serving process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    /// Listeners accepting connections.
    Running,
    /// Listeners closed to new connections, finishing in-flight requests.
    Draining,
    /// Both listeners have returned.
    Stopped,
}

/// Outcome of a completed drain.
#[derive(Debug, Clone, Copy)]
pub struct DrainReport {
    /// Time from the start of the drain until both listeners returned.
    pub elapsed: Duration,
    /// Connections open when the drain started.
    pub open_connections: usize,
}

/// Coordinator for graceful shutdown.
///
/// Waits for a termination trigger, then drains both listeners concurrently
/// within one deadline. Progress is published on a watch channel.
pub struct ShutdownCoordinator {
    deadline: Duration,
    state: watch::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    /// Create a coordinator that gives in-flight requests `deadline` to finish.
    pub fn new(deadline: Duration) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self { deadline, state }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Block until `signal` resolves and both listeners have drained.
    ///
    /// The signal is awaited on its own task. If a listener fails before the
    /// signal arrives, the other listener is stopped immediately and the
    /// failure is returned.
    pub async fn run<F>(
        self,
        mut listeners: RunningListeners,
        signal: F,
    ) -> Result<DrainReport, ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let waiter = tokio::spawn(async move {
            signal.await;
            let _ = done_tx.send(());
        });

        let failure = tokio::select! {
            _ = done_rx => None,
            failure = listeners.failed() => Some(failure),
        };

        if let Some(failure) = failure {
            waiter.abort();
            tracing::error!(error = %failure, "Listener failed, stopping");
            if let Err(e) = listeners.shutdown_now().await {
                tracing::warn!(error = %e, "Error stopping remaining listener");
            }
            self.state.send_replace(ShutdownState::Stopped);
            return Err(failure);
        }

        self.drain(listeners).await
    }

    async fn drain(self, listeners: RunningListeners) -> Result<DrainReport, ListenerError> {
        self.state.send_replace(ShutdownState::Draining);
        let open_connections = listeners.open_connections();
        tracing::info!(
            deadline = ?self.deadline,
            open_connections,
            "Draining listeners"
        );

        let started = Instant::now();
        let stopped = tokio::time::timeout(
            self.deadline + DRAIN_GRACE,
            listeners.shutdown(self.deadline),
        )
        .await;

        let result = match stopped {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "Listeners did not stop in time, abandoning");
                Ok(())
            }
        };

        self.state.send_replace(ShutdownState::Stopped);
        let report = DrainReport {
            elapsed: started.elapsed(),
            open_connections,
        };
        tracing::info!(elapsed = ?report.elapsed, "Shutdown complete");

        result.map(|()| report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListenerConfig;
    use crate::net::ListenerPair;
    use axum::Router;

    async fn listeners() -> RunningListeners {
        let config = ListenerConfig {
            address: "127.0.0.1:0".to_string(),
            ..ListenerConfig::default()
        };
        ListenerPair::new(Router::new(), config).start().await.unwrap()
    }

    #[tokio::test]
    async fn starts_running() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        assert_eq!(coordinator.state(), ShutdownState::Running);
    }

    #[tokio::test]
    async fn signal_moves_through_draining_to_stopped() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(200));
        let mut states = coordinator.subscribe();
        let (trigger, signal) = oneshot::channel::<()>();

        let run = tokio::spawn(coordinator.run(listeners().await, async move {
            let _ = signal.await;
        }));

        assert_eq!(*states.borrow(), ShutdownState::Running);
        trigger.send(()).unwrap();

        states
            .wait_for(|s| *s == ShutdownState::Draining || *s == ShutdownState::Stopped)
            .await
            .unwrap();
        let report = run.await.unwrap().unwrap();
        assert_eq!(*states.borrow(), ShutdownState::Stopped);
        assert_eq!(report.open_connections, 0);
        assert!(report.elapsed < Duration::from_secs(2));
    }
}
