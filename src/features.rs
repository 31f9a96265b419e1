//! Feature flags.
//!
//! Flags are named in the config's `[features]` table. Unknown names are a
//! startup error unless `AllowUnrecognizedFeatures` is enabled alongside them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureFlag {
    StoreRevokerInfo,
    RocspStage6,
    RocspStage7,
    CaaValidationMethods,
    CaaAccountUri,
    EnforceMultiVa,
    MultiVaFullResults,
    EcdsaForAll,
    ServeRenewalInfo,
    AllowUnrecognizedFeatures,
    ExpirationMailerUsesJoin,
    CertCheckerChecksValidations,
    CertCheckerRequiresValidations,
    AsyncFinalize,
    RequireCommonName,
    StoreLintingCertificateInsteadOfPrecertificate,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 16] = [
        FeatureFlag::StoreRevokerInfo,
        FeatureFlag::RocspStage6,
        FeatureFlag::RocspStage7,
        FeatureFlag::CaaValidationMethods,
        FeatureFlag::CaaAccountUri,
        FeatureFlag::EnforceMultiVa,
        FeatureFlag::MultiVaFullResults,
        FeatureFlag::EcdsaForAll,
        FeatureFlag::ServeRenewalInfo,
        FeatureFlag::AllowUnrecognizedFeatures,
        FeatureFlag::ExpirationMailerUsesJoin,
        FeatureFlag::CertCheckerChecksValidations,
        FeatureFlag::CertCheckerRequiresValidations,
        FeatureFlag::AsyncFinalize,
        FeatureFlag::RequireCommonName,
        FeatureFlag::StoreLintingCertificateInsteadOfPrecertificate,
    ];

    /// Name as written in configuration.
    pub fn name(self) -> &'static str {
        match self {
            FeatureFlag::StoreRevokerInfo => "StoreRevokerInfo",
            FeatureFlag::RocspStage6 => "ROCSPStage6",
            FeatureFlag::RocspStage7 => "ROCSPStage7",
            FeatureFlag::CaaValidationMethods => "CAAValidationMethods",
            FeatureFlag::CaaAccountUri => "CAAAccountURI",
            FeatureFlag::EnforceMultiVa => "EnforceMultiVA",
            FeatureFlag::MultiVaFullResults => "MultiVAFullResults",
            FeatureFlag::EcdsaForAll => "ECDSAForAll",
            FeatureFlag::ServeRenewalInfo => "ServeRenewalInfo",
            FeatureFlag::AllowUnrecognizedFeatures => "AllowUnrecognizedFeatures",
            FeatureFlag::ExpirationMailerUsesJoin => "ExpirationMailerUsesJoin",
            FeatureFlag::CertCheckerChecksValidations => "CertCheckerChecksValidations",
            FeatureFlag::CertCheckerRequiresValidations => "CertCheckerRequiresValidations",
            FeatureFlag::AsyncFinalize => "AsyncFinalize",
            FeatureFlag::RequireCommonName => "RequireCommonName",
            FeatureFlag::StoreLintingCertificateInsteadOfPrecertificate => {
                "StoreLintingCertificateInsteadOfPrecertificate"
            }
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for feature flag parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("unrecognized feature flag {0:?}")]
    Unrecognized(String),
}

impl FromStr for FeatureFlag {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureFlag::ALL
            .iter()
            .copied()
            .find(|flag| flag.name() == s)
            .ok_or_else(|| FeatureError::Unrecognized(s.to_string()))
    }
}

/// Enabled feature flags, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: BTreeSet<FeatureFlag>,
}

impl FeatureSet {
    /// Build from the config's flag table.
    pub fn from_config(flags: &BTreeMap<String, bool>) -> Result<Self, FeatureError> {
        let allow_unrecognized = flags
            .get(FeatureFlag::AllowUnrecognizedFeatures.name())
            .copied()
            .unwrap_or(false);

        let mut enabled = BTreeSet::new();
        for (name, &on) in flags {
            match name.parse::<FeatureFlag>() {
                Ok(flag) => {
                    if on {
                        enabled.insert(flag);
                    }
                }
                Err(e) if allow_unrecognized => {
                    tracing::warn!(error = %e, "Ignoring feature flag");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self { enabled })
    }

    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.enabled.contains(&flag)
    }

    pub fn enabled(&self) -> impl Iterator<Item = FeatureFlag> + '_ {
        self.enabled.iter().copied()
    }
}
