//! Reading and validating a single PEM certificate file.
//!
//! # Responsibilities
//! - Read one chain file from disk
//! - Enforce exactly one `CERTIFICATE` PEM block, LF line endings only
//! - Parse the block as X.509
//! - Normalize the trailing newline of the returned bytes
//!
//! # Design Decisions
//! - Each rule is a separate check with its own error variant
//! - Bytes outside the PEM block are rejected, never stripped

use std::fs;
use std::path::Path;
use thiserror::Error;
use x509_parser::pem::{parse_x509_pem, Pem};

use crate::trust::{ChainError, IssuerUrl};

const PEM_HEADER_PREFIX: &[u8] = b"-----BEGIN ";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const BEGIN_LINE: &str = "-----BEGIN CERTIFICATE-----";
const END_LINE: &str = "-----END CERTIFICATE-----";

/// Errors from parsing DER certificate bytes.
#[derive(Debug, Error)]
pub enum CertificateParseError {
    #[error("{0}")]
    Der(String),

    #[error("trailing data after certificate ({0} bytes)")]
    TrailingData(usize),
}

/// A parsed X.509 certificate, owned and immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCertificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    is_ca: bool,
}

impl ValidatedCertificate {
    /// Parse a DER-encoded certificate. Trailing bytes are rejected.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateParseError> {
        let (rest, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| CertificateParseError::Der(e.to_string()))?;
        if !rest.is_empty() {
            return Err(CertificateParseError::TrailingData(rest.len()));
        }

        Ok(Self {
            der: der.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.tbs_certificate.raw_serial_as_string(),
            is_ca: cert.tbs_certificate.is_ca(),
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Serial number as colon-separated hex.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn is_ca(&self) -> bool {
        self.is_ca
    }
}

/// Load a PEM certificate from `path` for the chain of `issuer`.
///
/// Returns the file's bytes (with a trailing newline appended if missing) and
/// the parsed certificate. Any deviation from a single well-formed
/// `CERTIFICATE` block with LF line endings is an error; leftover bytes would
/// otherwise end up in a served chain.
pub fn load_certificate_file(
    issuer: &IssuerUrl,
    path: &Path,
) -> Result<(Vec<u8>, ValidatedCertificate), ChainError> {
    let mut pem_bytes = fs::read(path).map_err(|source| ChainError::Read {
        issuer: issuer.clone(),
        path: path.to_path_buf(),
        source,
    })?;

    check_line_endings(issuer, path, &pem_bytes)?;
    check_leading_data(issuer, path, &pem_bytes)?;
    let (rest, block) = decode_pem(issuer, path, &pem_bytes)?;
    check_block_type(issuer, path, &block)?;
    check_armor_lines(issuer, path, &pem_bytes[..pem_bytes.len() - rest.len()])?;
    let cert = parse_certificate(issuer, path, &block)?;
    check_trailing_data(issuer, path, rest)?;

    if pem_bytes.last() != Some(&b'\n') {
        pem_bytes.push(b'\n');
    }

    tracing::debug!(
        issuer = %issuer,
        path = %path.display(),
        subject = %cert.subject(),
        "Chain certificate validated"
    );

    Ok((pem_bytes, cert))
}

fn check_line_endings(issuer: &IssuerUrl, path: &Path, bytes: &[u8]) -> Result<(), ChainError> {
    if bytes.windows(2).any(|w| w == b"\r\n") {
        return Err(ChainError::CrlfLineEndings {
            issuer: issuer.clone(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Text before the header would be served with the chain, so it is rejected
/// rather than skipped. Content without any PEM header is left to `decode_pem`.
fn check_leading_data(issuer: &IssuerUrl, path: &Path, bytes: &[u8]) -> Result<(), ChainError> {
    let has_header = bytes
        .windows(PEM_HEADER_PREFIX.len())
        .any(|w| w == PEM_HEADER_PREFIX);
    if has_header && !bytes.starts_with(PEM_HEADER_PREFIX) {
        return Err(ChainError::LeadingData {
            issuer: issuer.clone(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn decode_pem<'a>(
    issuer: &IssuerUrl,
    path: &Path,
    bytes: &'a [u8],
) -> Result<(&'a [u8], Pem), ChainError> {
    parse_x509_pem(bytes).map_err(|e| ChainError::NotPem {
        issuer: issuer.clone(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn check_block_type(issuer: &IssuerUrl, path: &Path, block: &Pem) -> Result<(), ChainError> {
    if block.label != CERTIFICATE_LABEL {
        return Err(ChainError::WrongBlockType {
            issuer: issuer.clone(),
            path: path.to_path_buf(),
            found: block.label.clone(),
        });
    }
    Ok(())
}

/// The decoder only matches line prefixes, so anything after the markers
/// would be swallowed without appearing in `rest`.
fn check_armor_lines(issuer: &IssuerUrl, path: &Path, block: &[u8]) -> Result<(), ChainError> {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.strip_suffix('\n').unwrap_or(&text).split('\n');

    let first = lines.next().unwrap_or_default();
    let last = lines.last().unwrap_or_default();
    for (found, expected) in [(first, BEGIN_LINE), (last, END_LINE)] {
        if found != expected {
            return Err(ChainError::MalformedArmor {
                issuer: issuer.clone(),
                path: path.to_path_buf(),
                found: found.to_string(),
                expected,
            });
        }
    }
    Ok(())
}

fn parse_certificate(
    issuer: &IssuerUrl,
    path: &Path,
    block: &Pem,
) -> Result<ValidatedCertificate, ChainError> {
    ValidatedCertificate::from_der(&block.contents).map_err(|e| ChainError::MalformedCertificate {
        issuer: issuer.clone(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn check_trailing_data(issuer: &IssuerUrl, path: &Path, rest: &[u8]) -> Result<(), ChainError> {
    if !rest.is_empty() {
        return Err(ChainError::TrailingData {
            issuer: issuer.clone(),
            path: path.to_path_buf(),
            len: rest.len(),
        });
    }
    Ok(())
}
