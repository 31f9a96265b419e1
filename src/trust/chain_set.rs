//! Merging default and alternate chains into per-issuer chain sets.

use std::collections::HashMap;

use crate::trust::{AssembledChains, ChainError, ChainPem, ChainSet, IssuerUrl, TrustMaterial};

/// Combine default chains with optional alternates.
///
/// Every issuer with a default chain gets a [`ChainSet`] with that chain at
/// index 0; an alternate for the same issuer follows it. An alternate for an
/// issuer without a default chain fails the whole build. Issuer certificates
/// come from the default chains only.
pub fn build_chain_sets(
    defaults: AssembledChains,
    alternates: Option<AssembledChains>,
) -> Result<TrustMaterial, ChainError> {
    let alternates: HashMap<IssuerUrl, Vec<ChainPem>> = alternates
        .map(|alt| {
            alt.chains
                .into_iter()
                .map(|(issuer, chain)| (issuer, vec![chain]))
                .collect()
        })
        .unwrap_or_default();

    let chains = build_chain_sets_from_lists(defaults.chains, alternates)?;
    Ok(TrustMaterial::new(chains, defaults.issuer_certificates))
}

/// Like [`build_chain_sets`] but accepts any number of alternates per issuer,
/// appended in the order given.
pub fn build_chain_sets_from_lists(
    defaults: HashMap<IssuerUrl, ChainPem>,
    alternates: HashMap<IssuerUrl, Vec<ChainPem>>,
) -> Result<HashMap<IssuerUrl, ChainSet>, ChainError> {
    let mut sets: HashMap<IssuerUrl, ChainSet> = defaults
        .into_iter()
        .map(|(issuer, chain)| (issuer, ChainSet::new(chain)))
        .collect();

    let mut alternates: Vec<(IssuerUrl, Vec<ChainPem>)> = alternates.into_iter().collect();
    alternates.sort_by(|a, b| a.0.cmp(&b.0));

    for (issuer, chains) in alternates {
        let Some(set) = sets.get_mut(&issuer) else {
            return Err(ChainError::AlternateWithoutDefault { issuer });
        };
        for chain in chains {
            set.push_alternate(chain);
        }
    }

    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(s: &str) -> ChainPem {
        ChainPem::from(s.as_bytes().to_vec())
    }

    fn assembled(entries: &[(&str, &str)]) -> AssembledChains {
        AssembledChains {
            chains: entries
                .iter()
                .map(|(issuer, pem)| (IssuerUrl::from(*issuer), chain(pem)))
                .collect(),
            issuer_certificates: Vec::new(),
        }
    }

    #[test]
    fn alternate_follows_default() {
        let material = build_chain_sets(
            assembled(&[("X", "chainD")]),
            Some(assembled(&[("X", "chainA")])),
        )
        .unwrap();

        let set = material.chain_set("X").unwrap();
        assert_eq!(set.as_slice(), &[chain("chainD"), chain("chainA")]);
    }

    #[test]
    fn defaults_only() {
        let material = build_chain_sets(assembled(&[("X", "d1"), ("Y", "d2")]), None).unwrap();

        assert_eq!(material.chains().len(), 2);
        assert_eq!(material.chain_set("Y").unwrap().as_slice(), &[chain("d2")]);
    }

    #[test]
    fn issuer_without_alternate_keeps_single_chain() {
        let material = build_chain_sets(
            assembled(&[("X", "d1"), ("Y", "d2")]),
            Some(assembled(&[("X", "a1")])),
        )
        .unwrap();

        assert_eq!(material.chain_set("X").unwrap().as_slice().len(), 2);
        assert_eq!(material.chain_set("Y").unwrap().as_slice().len(), 1);
    }

    #[test]
    fn alternate_without_default_rejected() {
        let err = build_chain_sets(
            assembled(&[("X", "d1")]),
            Some(assembled(&[("X", "a1"), ("Z", "a2")])),
        )
        .unwrap_err();

        match err {
            ChainError::AlternateWithoutDefault { issuer } => assert_eq!(issuer.as_str(), "Z"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn many_alternates_keep_order() {
        let mut defaults = HashMap::new();
        defaults.insert(IssuerUrl::from("X"), chain("d"));
        let mut alternates = HashMap::new();
        alternates.insert(IssuerUrl::from("X"), vec![chain("a1"), chain("a2")]);

        let sets = build_chain_sets_from_lists(defaults, alternates).unwrap();
        let set = &sets["X"];
        assert_eq!(set.default_chain(), &chain("d"));
        assert_eq!(set.alternates(), &[chain("a1"), chain("a2")]);
    }
}
