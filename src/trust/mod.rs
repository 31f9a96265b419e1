//! Trust-material subsystem.
//!
//! # Data Flow
//! ```text
//! ChainsConfig (issuer URL → ordered chain files)
//!     → certificate.rs (read + validate one PEM certificate per file)
//!     → assembler.rs (concatenate files per issuer, record direct issuers)
//!     → chain_set.rs (merge default and alternate chains)
//!     → TrustMaterial (frozen, shared via Arc with the request handler)
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first invalid file aborts the whole load
//! - Nothing here is mutated after startup; no reload path exists
//! - Chain bytes are served verbatim, so validation is byte-exact

pub mod assembler;
pub mod certificate;
pub mod chain_set;
pub mod error;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::config::ChainsConfig;

pub use assembler::{load_certificate_chains, AssembledChains};
pub use certificate::{load_certificate_file, ValidatedCertificate};
pub use chain_set::{build_chain_sets, build_chain_sets_from_lists};
pub use error::ChainError;

/// Authority Information Access issuer URL identifying an issuing certificate.
///
/// Opaque: used only as a map key, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct IssuerUrl(String);

impl IssuerUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssuerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssuerUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for IssuerUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl Borrow<str> for IssuerUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A complete PEM certificate chain, ready to be served verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPem(Bytes);

impl ChainPem {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Cheap reference-counted handle to the chain bytes.
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }
}

impl From<Vec<u8>> for ChainPem {
    fn from(buf: Vec<u8>) -> Self {
        Self(Bytes::from(buf))
    }
}

/// All chains served for one issuer. Index 0 is the default chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSet {
    chains: Vec<ChainPem>,
}

impl ChainSet {
    /// Create a chain set holding only the default chain.
    pub fn new(default: ChainPem) -> Self {
        Self {
            chains: vec![default],
        }
    }

    pub(crate) fn push_alternate(&mut self, chain: ChainPem) {
        self.chains.push(chain);
    }

    pub fn default_chain(&self) -> &ChainPem {
        &self.chains[0]
    }

    pub fn alternates(&self) -> &[ChainPem] {
        &self.chains[1..]
    }

    /// Chain at `index`, where 0 is the default.
    pub fn get(&self, index: usize) -> Option<&ChainPem> {
        self.chains.get(index)
    }

    pub fn as_slice(&self) -> &[ChainPem] {
        &self.chains
    }
}

/// Validated chain sets and direct issuer certificates.
///
/// Built once during startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    chains: HashMap<IssuerUrl, ChainSet>,
    issuer_certificates: Vec<ValidatedCertificate>,
}

impl TrustMaterial {
    pub(crate) fn new(
        chains: HashMap<IssuerUrl, ChainSet>,
        issuer_certificates: Vec<ValidatedCertificate>,
    ) -> Self {
        Self {
            chains,
            issuer_certificates,
        }
    }

    /// Chain set for an issuer URL.
    pub fn chain_set(&self, issuer: &str) -> Option<&ChainSet> {
        self.chains.get(issuer)
    }

    pub fn chains(&self) -> &HashMap<IssuerUrl, ChainSet> {
        &self.chains
    }

    /// First certificate of every default chain.
    pub fn issuer_certificates(&self) -> &[ValidatedCertificate] {
        &self.issuer_certificates
    }

    /// Issuer URLs in sorted order.
    pub fn issuers(&self) -> Vec<&IssuerUrl> {
        let mut issuers: Vec<&IssuerUrl> = self.chains.keys().collect();
        issuers.sort();
        issuers
    }
}

/// Load default and alternate chains from configuration into [`TrustMaterial`].
pub fn load_trust_material(config: &ChainsConfig) -> Result<TrustMaterial, ChainError> {
    let defaults = load_certificate_chains(&config.certificate_chains, true)?;

    let alternates = match &config.alternate_certificate_chains {
        Some(alternates) => Some(load_certificate_chains(alternates, false)?),
        None => None,
    };

    let material = build_chain_sets(defaults, alternates)?;

    tracing::info!(
        issuers = material.chains.len(),
        issuer_certificates = material.issuer_certificates.len(),
        "Certificate chains loaded"
    );

    Ok(material)
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Certificate fixtures for unit tests.

    use std::fs;
    use std::path::{Path, PathBuf};

    /// A generated certificate: LF-only PEM (with trailing newline) and DER.
    pub struct Fixture {
        pub pem: String,
        pub der: Vec<u8>,
    }

    pub fn certificate(name: &str) -> Fixture {
        let certified = rcgen::generate_simple_self_signed(vec![name.to_string()]).unwrap();
        let pem = certified.cert.pem().replace("\r\n", "\n");
        Fixture {
            pem: format!("{}\n", pem.trim_end()),
            der: certified.cert.der().to_vec(),
        }
    }

    pub fn private_key_pem() -> String {
        let certified = rcgen::generate_simple_self_signed(vec!["key".to_string()]).unwrap();
        let pem = certified.key_pair.serialize_pem().replace("\r\n", "\n");
        format!("{}\n", pem.trim_end())
    }

    pub fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::testutil;
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn issuer_url_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(IssuerUrl::from("http://issuer.example/a"), 1);
        assert_eq!(map.get("http://issuer.example/a"), Some(&1));
        assert_eq!(IssuerUrl::new("x").to_string(), "x");
    }

    #[test]
    fn chain_set_default_first() {
        let mut set = ChainSet::new(ChainPem::from(b"default".to_vec()));
        set.push_alternate(ChainPem::from(b"alt".to_vec()));

        assert_eq!(set.default_chain().as_bytes(), b"default");
        assert_eq!(set.alternates().len(), 1);
        assert_eq!(set.get(1).map(ChainPem::as_bytes), Some(&b"alt"[..]));
        assert!(set.get(2).is_none());
    }

    #[test]
    fn load_trust_material_without_alternates() {
        let dir = tempfile::tempdir().unwrap();
        let cert = testutil::certificate("int.example");
        let path = testutil::write(dir.path(), "int.pem", &cert.pem);

        let mut chains = HashMap::new();
        chains.insert(IssuerUrl::from("http://issuer.example/int"), vec![path]);
        let config = ChainsConfig {
            certificate_chains: chains,
            alternate_certificate_chains: None,
        };

        let material = load_trust_material(&config).unwrap();
        let set = material.chain_set("http://issuer.example/int").unwrap();
        assert_eq!(set.as_slice().len(), 1);
        assert_eq!(material.issuer_certificates().len(), 1);
        assert_eq!(material.issuers().len(), 1);
    }
}
