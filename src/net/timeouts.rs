//! Connection timeout policy shared by both listeners.
//!
//! # Responsibilities
//! - Bound how long a client may take to send request headers (read)
//! - Bound how long a response may take to produce (write)
//! - Close connections with no traffic (idle)
//!
//! # Design Decisions
//! - Fixed operational constants, not configurable per request
//! - Read uses hyper's header read timeout, write a tower-http layer,
//!   idle the connection acceptor's stream wrapper

use axum::http::StatusCode;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Timeouts applied to every connection on a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub read: Duration,
    pub write: Duration,
    pub idle: Duration,
}

impl TimeoutPolicy {
    pub const DEFAULT: TimeoutPolicy = TimeoutPolicy {
        read: Duration::from_secs(30),
        write: Duration::from_secs(120),
        idle: Duration::from_secs(120),
    };

    /// Configure the connection builder with the read timeout.
    pub fn apply(&self, builder: &mut auto::Builder<TokioExecutor>) {
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.read);
    }

    /// Wrap a router so no response takes longer than the write timeout.
    pub fn limit_responses(&self, router: Router) -> Router {
        router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            self.write,
        ))
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
