//! Trust-material error definitions.

use std::path::PathBuf;
use thiserror::Error;

use crate::trust::IssuerUrl;

/// Errors raised while reading and assembling certificate chains.
///
/// Every variant is fatal at startup. Each names the issuer URL and, where a
/// file is involved, the offending path so an operator can fix the config.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The chain file could not be read.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: error reading contents: {source}")]
    Read {
        issuer: IssuerUrl,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file contains at least one CRLF sequence.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: contents had CRLF line endings")]
    CrlfLineEndings { issuer: IssuerUrl, path: PathBuf },

    /// Bytes precede the PEM header.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: contents do not start with a PEM header")]
    LeadingData { issuer: IssuerUrl, path: PathBuf },

    /// The contents did not decode as PEM.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: contents did not decode as PEM: {reason}")]
    NotPem {
        issuer: IssuerUrl,
        path: PathBuf,
        reason: String,
    },

    /// The PEM block is not a certificate.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: PEM block type incorrect, found {found:?}, expected \"CERTIFICATE\"")]
    WrongBlockType {
        issuer: IssuerUrl,
        path: PathBuf,
        found: String,
    },

    /// A BEGIN or END line carries more than the bare `CERTIFICATE` marker.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: PEM armor line {found:?}, expected {expected:?}")]
    MalformedArmor {
        issuer: IssuerUrl,
        path: PathBuf,
        found: String,
        expected: &'static str,
    },

    /// The PEM payload is not a well-formed X.509 certificate.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: certificate bytes failed to parse: {reason}")]
    MalformedCertificate {
        issuer: IssuerUrl,
        path: PathBuf,
        reason: String,
    },

    /// Bytes remain after the PEM block.
    #[error("chain entry for issuer \"{issuer}\" has an invalid chain file {path:?}: PEM contents had unused remainder input ({len} bytes)")]
    TrailingData {
        issuer: IssuerUrl,
        path: PathBuf,
        len: usize,
    },

    /// A required chain has no files configured.
    #[error("chain entry for issuer \"{issuer}\" has no chain file names configured")]
    NoChainFiles { issuer: IssuerUrl },

    /// An alternate chain names an issuer with no default chain.
    #[error("issuer \"{issuer}\" appeared in alternate certificate chains but does not exist in certificate chains")]
    AlternateWithoutDefault { issuer: IssuerUrl },
}

impl ChainError {
    /// Issuer URL the error refers to.
    pub fn issuer(&self) -> &IssuerUrl {
        match self {
            ChainError::Read { issuer, .. }
            | ChainError::CrlfLineEndings { issuer, .. }
            | ChainError::LeadingData { issuer, .. }
            | ChainError::NotPem { issuer, .. }
            | ChainError::WrongBlockType { issuer, .. }
            | ChainError::MalformedArmor { issuer, .. }
            | ChainError::MalformedCertificate { issuer, .. }
            | ChainError::TrailingData { issuer, .. }
            | ChainError::NoChainFiles { issuer }
            | ChainError::AlternateWithoutDefault { issuer } => issuer,
        }
    }
}
