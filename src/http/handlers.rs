//! Trust-data request handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

/// Media type for PEM certificate chains (RFC 8555 §9.1).
pub const PEM_CHAIN_CONTENT_TYPE: &str = "application/pem-certificate-chain";

#[derive(Serialize)]
pub struct IssuerSummary {
    pub issuer: String,
    pub chains: usize,
}

#[derive(Serialize)]
pub struct IssuerCertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub is_ca: bool,
}

#[derive(Deserialize)]
pub struct ChainQuery {
    pub issuer: String,
    #[serde(default)]
    pub alternate: usize,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_issuers(State(state): State<AppState>) -> Json<Vec<IssuerSummary>> {
    let summaries = state
        .trust
        .issuers()
        .into_iter()
        .filter_map(|issuer| {
            state.trust.chain_set(issuer.as_str()).map(|set| IssuerSummary {
                issuer: issuer.to_string(),
                chains: set.as_slice().len(),
            })
        })
        .collect();
    Json(summaries)
}

pub async fn list_issuer_certificates(
    State(state): State<AppState>,
) -> Json<Vec<IssuerCertificateSummary>> {
    Json(
        state
            .trust
            .issuer_certificates()
            .iter()
            .map(|cert| IssuerCertificateSummary {
                subject: cert.subject().to_string(),
                issuer: cert.issuer().to_string(),
                serial: cert.serial().to_string(),
                is_ca: cert.is_ca(),
            })
            .collect(),
    )
}

/// Serve one chain of an issuer. `alternate=0` (the default) is the default chain.
pub async fn get_chain(State(state): State<AppState>, Query(query): Query<ChainQuery>) -> Response {
    let Some(set) = state.trust.chain_set(&query.issuer) else {
        tracing::debug!(issuer = %query.issuer, "Chain requested for unknown issuer");
        return (StatusCode::NOT_FOUND, "Unknown issuer").into_response();
    };
    let Some(chain) = set.get(query.alternate) else {
        return (StatusCode::NOT_FOUND, "Unknown chain").into_response();
    };

    (
        [(header::CONTENT_TYPE, PEM_CHAIN_CONTENT_TYPE)],
        chain.to_bytes(),
    )
        .into_response()
}

pub async fn list_features(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.features.enabled().map(|flag| flag.name()).collect())
}
