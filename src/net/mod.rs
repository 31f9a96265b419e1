//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (plaintext or TLS server, shared router)
//!     → transport.rs (handshake error logging, idle timeout)
//!     → timeouts.rs (header read and response deadlines)
//!     → Hand off to HTTP layer
//!
//! Listener states:
//!     Bound → Serving → Draining → Stopped
//! ```
//!
//! # Design Decisions
//! - One handler shared by both listeners
//! - TLS is optional and enabled only by a non-empty address
//! - Any serve error besides shutdown is fatal

pub mod listener;
pub mod timeouts;
pub mod tls;
pub mod transport;

pub use listener::{ListenerError, ListenerPair, RunningListeners};
pub use timeouts::TimeoutPolicy;
