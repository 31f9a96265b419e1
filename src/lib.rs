//! ACME Issuance Front End Library

pub mod config;
pub mod features;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod trust;

pub use config::FrontendConfig;
pub use http::FrontEnd;
pub use lifecycle::ShutdownCoordinator;
pub use trust::TrustMaterial;
