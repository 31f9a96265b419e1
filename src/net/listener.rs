//! Plaintext and TLS listeners sharing one request handler.
//!
//! # Responsibilities
//! - Bind the plaintext listener and, if configured, the TLS listener
//! - Apply the shared timeout policy to both
//! - Report serve failures on a fatal channel
//! - Drain both listeners concurrently on shutdown
//!
//! # Design Decisions
//! - All configuration and TLS material is checked before anything binds
//! - An empty TLS address means no TLS listener, not an error
//! - A clean return after shutdown is the only non-fatal way a listener ends

use axum::Router;
use axum_server::accept::DefaultAcceptor;
use axum_server::tls_rustls::RustlsAcceptor;
use axum_server::Handle;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ListenerConfig;
use crate::net::timeouts::TimeoutPolicy;
use crate::net::tls::{load_tls_config, TlsError};
use crate::net::transport::ConnectionAcceptor;

const PLAINTEXT: &str = "http";
const TLS: &str = "https";

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Configured address is not a socket address.
    #[error("{listener} listener address {value:?} is invalid")]
    InvalidAddress { listener: &'static str, value: String },

    /// TLS listener enabled without key material.
    #[error("{listener} listener requires {field}")]
    MissingTlsMaterial {
        listener: &'static str,
        field: &'static str,
    },

    /// TLS key material could not be loaded.
    #[error("Loading TLS listener key material: {0}")]
    Tls(#[from] TlsError),

    /// Failed to bind to address.
    #[error("{listener} listener failed to bind {address}: {source}")]
    Bind {
        listener: &'static str,
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Listener stopped with an error while serving.
    #[error("Running {listener} server on {address}: {source}")]
    Serve {
        listener: &'static str,
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Serve task panicked or was cancelled.
    #[error("{listener} listener task failed: {reason}")]
    Task {
        listener: &'static str,
        reason: String,
    },
}

/// Two listeners, one handler.
pub struct ListenerPair {
    router: Router,
    config: ListenerConfig,
    policy: TimeoutPolicy,
}

impl ListenerPair {
    pub fn new(router: Router, config: ListenerConfig) -> Self {
        Self {
            router,
            config,
            policy: TimeoutPolicy::DEFAULT,
        }
    }

    /// Override the timeout policy.
    pub fn with_timeouts(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start serving on every configured listener.
    ///
    /// Returns once each listener is bound. A listener that fails to bind
    /// stops the already started one and is reported as an error.
    pub async fn start(self) -> Result<RunningListeners, ListenerError> {
        let policy = self.policy;
        let plain_addr = parse_address(PLAINTEXT, &self.config.address)?;
        let tls = if self.config.tls_enabled() {
            let addr = parse_address(TLS, &self.config.tls_address)?;
            let cert = required_path(&self.config.server_certificate_path, "server_certificate_path")?;
            let key = required_path(&self.config.server_key_path, "server_key_path")?;
            Some((addr, load_tls_config(&cert, &key).await?))
        } else {
            tracing::info!("TLS listener address not configured, TLS listener disabled");
            None
        };

        let app = policy.limit_responses(self.router);
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();

        let plain_handle = Handle::new();
        let mut server = axum_server::bind(plain_addr)
            .acceptor(ConnectionAcceptor::new(DefaultAcceptor::new(), PLAINTEXT, policy.idle))
            .handle(plain_handle.clone());
        policy.apply(server.http_builder());
        let serving = server.serve(app.clone().into_make_service());
        let plain = ServingListener::spawn(PLAINTEXT, plain_addr, plain_handle, serving, fatal_tx.clone())
            .await
            .ok_or_else(|| bind_failure(&mut fatal_rx, PLAINTEXT, plain_addr))?;

        let tls = match tls {
            Some((addr, rustls)) => {
                let handle = Handle::new();
                let acceptor = RustlsAcceptor::new(rustls);
                let mut server = axum_server::bind(addr)
                    .acceptor(ConnectionAcceptor::new(acceptor, TLS, policy.idle))
                    .handle(handle.clone());
                policy.apply(server.http_builder());
                let serving = server.serve(app.into_make_service());
                match ServingListener::spawn(TLS, addr, handle, serving, fatal_tx).await {
                    Some(listener) => Some(listener),
                    None => {
                        plain.handle.shutdown();
                        return Err(bind_failure(&mut fatal_rx, TLS, addr));
                    }
                }
            }
            None => None,
        };

        Ok(RunningListeners {
            plain,
            tls,
            fatal_rx,
        })
    }
}

fn parse_address(listener: &'static str, value: &str) -> Result<SocketAddr, ListenerError> {
    value
        .trim()
        .parse()
        .map_err(|_| ListenerError::InvalidAddress {
            listener,
            value: value.to_string(),
        })
}

fn required_path(path: &Option<PathBuf>, field: &'static str) -> Result<PathBuf, ListenerError> {
    path.clone().ok_or(ListenerError::MissingTlsMaterial {
        listener: TLS,
        field,
    })
}

/// Turn the error a listener reported while binding into a bind error.
fn bind_failure(
    fatal_rx: &mut mpsc::UnboundedReceiver<ListenerError>,
    listener: &'static str,
    address: SocketAddr,
) -> ListenerError {
    match fatal_rx.try_recv() {
        Ok(ListenerError::Serve { source, .. }) => ListenerError::Bind {
            listener,
            address,
            source,
        },
        Ok(other) => other,
        Err(_) => ListenerError::Task {
            listener,
            reason: "stopped before binding".to_string(),
        },
    }
}

/// A spawned serve task and the handle controlling it.
struct ServingListener {
    name: &'static str,
    local_addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<()>,
}

impl ServingListener {
    /// Spawn the serve future and wait for it to bind.
    ///
    /// Returns `None` if binding failed. The task is awaited first, so its
    /// error is already queued on `fatal_tx`.
    async fn spawn<F>(
        name: &'static str,
        address: SocketAddr,
        handle: Handle,
        serving: F,
        fatal_tx: mpsc::UnboundedSender<ListenerError>,
    ) -> Option<Self>
    where
        F: Future<Output = std::io::Result<()>> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            match serving.await {
                Ok(()) => tracing::info!(listener = name, "Listener stopped"),
                Err(source) => {
                    let _ = fatal_tx.send(ListenerError::Serve {
                        listener: name,
                        address,
                        source,
                    });
                }
            }
        });

        match handle.listening().await {
            Some(local_addr) => {
                tracing::info!(listener = name, address = %local_addr, "Server running");
                Some(Self {
                    name,
                    local_addr,
                    handle,
                    task,
                })
            }
            None => {
                let _ = task.await;
                None
            }
        }
    }

    async fn join(self) -> Result<(), ListenerError> {
        self.task.await.map_err(|e| ListenerError::Task {
            listener: self.name,
            reason: e.to_string(),
        })
    }
}

/// Listeners that are bound and serving.
pub struct RunningListeners {
    plain: ServingListener,
    tls: Option<ServingListener>,
    fatal_rx: mpsc::UnboundedReceiver<ListenerError>,
}

impl RunningListeners {
    /// Bound address of the plaintext listener.
    pub fn local_addr(&self) -> SocketAddr {
        self.plain.local_addr
    }

    /// Bound address of the TLS listener, if one was started.
    pub fn tls_local_addr(&self) -> Option<SocketAddr> {
        self.tls.as_ref().map(|l| l.local_addr)
    }

    /// Connections currently open across both listeners.
    pub fn open_connections(&self) -> usize {
        self.plain.handle.connection_count()
            + self
                .tls
                .as_ref()
                .map_or(0, |l| l.handle.connection_count())
    }

    /// Resolve with the first fatal serve error.
    pub async fn failed(&mut self) -> ListenerError {
        match self.fatal_rx.recv().await {
            Some(err) => err,
            None => std::future::pending().await,
        }
    }

    /// Stop accepting and give in-flight requests up to `deadline`.
    ///
    /// Both listeners drain concurrently. Connections still open at the
    /// deadline are closed.
    pub async fn shutdown(self, deadline: Duration) -> Result<(), ListenerError> {
        let RunningListeners { plain, tls, .. } = self;

        plain.handle.graceful_shutdown(Some(deadline));
        if let Some(tls) = &tls {
            tls.handle.graceful_shutdown(Some(deadline));
        }

        let (plain, tls) = tokio::join!(plain.join(), async move {
            match tls {
                Some(tls) => tls.join().await,
                None => Ok(()),
            }
        });
        plain.and(tls)
    }

    /// Close every connection without waiting.
    pub async fn shutdown_now(self) -> Result<(), ListenerError> {
        self.shutdown(Duration::ZERO).await
    }
}
