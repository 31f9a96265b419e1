//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Consumers:
//!     → stdout, pretty for development or JSON for log aggregation
//! ```
//!
//! # Design Decisions
//! - Log level comes from config unless `RUST_LOG` overrides it
//! - Transport errors are logged through the same pipeline as everything else

pub mod logging;

pub use logging::init;
