//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load trust material → Feature flags → Build handler → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!     Running → Draining → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGHUP → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: trust material first, listeners last
//! - Both listeners drain concurrently under one deadline
//! - Shutdown has timeout: remaining connections closed after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{DrainReport, ShutdownCoordinator, ShutdownState};
pub use signals::TerminationSignals;
pub use startup::{start, Started, StartupError};
