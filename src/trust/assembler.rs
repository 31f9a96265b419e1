//! Per-issuer chain assembly.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::trust::{load_certificate_file, ChainError, ChainPem, IssuerUrl, ValidatedCertificate};

/// Concatenated chains keyed by issuer, plus the first certificate of each.
#[derive(Debug, Clone, Default)]
pub struct AssembledChains {
    pub chains: HashMap<IssuerUrl, ChainPem>,
    pub issuer_certificates: Vec<ValidatedCertificate>,
}

/// Read every configured chain file and concatenate them per issuer.
///
/// Files are appended in configuration order, each preceded by a newline.
/// The first certificate of each issuer's list is recorded as a direct issuer
/// certificate. With `require_at_least_one_chain`, an issuer with no files is
/// an error; otherwise it simply produces no entry. The first failure aborts
/// the whole assembly.
pub fn load_certificate_chains(
    chain_config: &HashMap<IssuerUrl, Vec<PathBuf>>,
    require_at_least_one_chain: bool,
) -> Result<AssembledChains, ChainError> {
    let mut assembled = AssembledChains {
        chains: HashMap::with_capacity(chain_config.len()),
        issuer_certificates: Vec::new(),
    };

    // Sorted so the issuer certificate list and the first reported error are stable.
    let mut issuers: Vec<(&IssuerUrl, &Vec<PathBuf>)> = chain_config.iter().collect();
    issuers.sort_by(|a, b| a.0.cmp(b.0));

    for (issuer, cert_files) in issuers {
        if require_at_least_one_chain && cert_files.is_empty() {
            return Err(ChainError::NoChainFiles {
                issuer: issuer.clone(),
            });
        }

        let mut buffer = Vec::new();
        for (i, cert_file) in cert_files.iter().enumerate() {
            buffer.push(b'\n');

            let (pem_bytes, cert) = load_certificate_file(issuer, cert_file)?;
            if i == 0 {
                assembled.issuer_certificates.push(cert);
            }

            buffer.extend_from_slice(&pem_bytes);
        }

        if !buffer.is_empty() {
            tracing::debug!(
                issuer = %issuer,
                files = cert_files.len(),
                bytes = buffer.len(),
                "Chain assembled"
            );
            assembled.chains.insert(issuer.clone(), ChainPem::from(buffer));
        }
    }

    Ok(assembled)
}
