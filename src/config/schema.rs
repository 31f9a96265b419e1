//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the front end.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use crate::trust::IssuerUrl;

/// Root configuration for the front end.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// Listener configuration (bind addresses, TLS material, shutdown).
    pub listener: ListenerConfig,

    /// Certificate chains served per issuer.
    pub chains: ChainsConfig,

    /// Feature flags by name.
    pub features: BTreeMap<String, bool>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Plaintext bind address (e.g., "0.0.0.0:4001").
    pub address: String,

    /// TLS bind address. Empty disables the TLS listener.
    pub tls_address: String,

    /// Path to the TLS server certificate chain (PEM).
    pub server_certificate_path: Option<PathBuf>,

    /// Path to the TLS server private key (PEM).
    pub server_key_path: Option<PathBuf>,

    /// Time allowed for in-flight requests to finish on shutdown, in seconds.
    pub shutdown_stop_timeout_secs: u64,
}

impl ListenerConfig {
    /// Whether a TLS listener should be started.
    pub fn tls_enabled(&self) -> bool {
        !self.tls_address.trim().is_empty()
    }

    pub fn shutdown_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_stop_timeout_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:4001".to_string(),
            tls_address: String::new(),
            server_certificate_path: None,
            server_key_path: None,
            shutdown_stop_timeout_secs: 10,
        }
    }
}

/// Certificate chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ChainsConfig {
    /// Issuer URL → ordered chain file paths. Every issuer needs at least one file.
    pub certificate_chains: HashMap<IssuerUrl, Vec<PathBuf>>,

    /// Issuer URL → ordered chain file paths of an alternate chain.
    pub alternate_certificate_chains: Option<HashMap<IssuerUrl, Vec<PathBuf>>>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
