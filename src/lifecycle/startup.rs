//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate trust material and feature flags
//! - Build the request handler around the frozen trust data
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Trust material is fully validated before any listener binds
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use thiserror::Error;

use crate::config::FrontendConfig;
use crate::features::{FeatureError, FeatureSet};
use crate::http::FrontEnd;
use crate::lifecycle::shutdown::ShutdownCoordinator;
use crate::net::{ListenerError, ListenerPair, RunningListeners};
use crate::trust::{self, ChainError};

/// Error type for process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Couldn't read configured certificate chains: {0}")]
    Chains(#[from] ChainError),

    #[error("Failed to set feature flags: {0}")]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// A started front end: serving listeners and the coordinator that will stop them.
pub struct Started {
    pub listeners: RunningListeners,
    pub coordinator: ShutdownCoordinator,
}

/// Build everything the listeners need, then start them.
pub async fn start(config: &FrontendConfig) -> Result<Started, StartupError> {
    let trust = Arc::new(trust::load_trust_material(&config.chains)?);
    let features = FeatureSet::from_config(&config.features)?;
    tracing::info!(
        features = ?features.enabled().map(|f| f.name()).collect::<Vec<_>>(),
        "Feature flags set"
    );

    let frontend = FrontEnd::new(trust, features);
    let listeners = ListenerPair::new(frontend.router(), config.listener.clone())
        .start()
        .await?;

    Ok(Started {
        listeners,
        coordinator: ShutdownCoordinator::new(config.listener.shutdown_stop_timeout()),
    })
}
