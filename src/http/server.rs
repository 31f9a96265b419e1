//! HTTP handler setup.
//!
//! # Responsibilities
//! - Create the Axum Router shared by both listeners
//! - Inject the frozen trust material and feature flags as state
//! - Wire up request tracing

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::features::FeatureSet;
use crate::http::handlers::{
    get_chain, health, list_features, list_issuer_certificates, list_issuers,
};
use crate::trust::TrustMaterial;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub trust: Arc<TrustMaterial>,
    pub features: Arc<FeatureSet>,
}

/// The request handler served on both listeners.
pub struct FrontEnd {
    state: AppState,
}

impl FrontEnd {
    pub fn new(trust: Arc<TrustMaterial>, features: FeatureSet) -> Self {
        Self {
            state: AppState {
                trust,
                features: Arc::new(features),
            },
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/issuers", get(list_issuers))
            .route("/issuer-certificates", get(list_issuer_certificates))
            .route("/chain", get(get_chain))
            .route("/features", get(list_features))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }
}
