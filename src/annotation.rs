use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Selects which VEP annotation run is attached to returned variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationVersionConstraint {
    pub vep_version: String,
    pub vep_cache_version: String,
}

impl AnnotationVersionConstraint {
    pub fn new(vep_version: impl Into<String>, vep_cache_version: impl Into<String>) -> Self {
        Self {
            vep_version: vep_version.into(),
            vep_cache_version: vep_cache_version.into(),
        }
    }

    /// Builds the constraint from the optional request parameters.
    ///
    /// Both or neither must be supplied; a lone version is a client error.
    pub fn from_params(
        vep_version: Option<&str>,
        vep_cache_version: Option<&str>,
    ) -> Result<Option<Self>> {
        match (vep_version, vep_cache_version) {
            (Some(version), Some(cache_version)) => Ok(Some(Self::new(version, cache_version))),
            (None, None) => Ok(None),
            _ => Err(Error::InconsistentAnnotationVersion),
        }
    }

    pub fn matches(&self, vep_version: &str, vep_cache_version: &str) -> bool {
        self.vep_version == vep_version && self.vep_cache_version == vep_cache_version
    }
}
