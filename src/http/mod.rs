//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net layer)
//!     → server.rs (Axum router, shared state, tracing)
//!     → handlers.rs (read-only views of the trust material)
//!     → Send to client
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, FrontEnd};
