//! CMS release metadata.
//!
//! Each supported CMS publishes its release history differently. This module
//! normalizes all of them behind `ReleaseMetadataProvider`:
//! - `latest_branches`: one entry per release branch with its newest version
//!   and whether upstream still supports it
//! - `downloadable_packages`: every release with its archive URL
//!
//! Providers are looked up by family name through `ReleaseRegistry`.

mod drupal;
mod http;
mod joomla;
mod typo3;
mod wordpress;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error_handling::ReleaseError;

pub use drupal::DrupalReleases;
pub use joomla::JoomlaReleases;
pub use typo3::Typo3Releases;
pub use wordpress::WordpressReleases;

/// A release branch of one CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseBranch {
    /// Branch label, matched as a prefix of detected versions (e.g. `"7.2"` or `"12"`)
    pub branch: String,
    /// Newest released version of the branch
    pub latest_version: String,
    /// Whether upstream still ships security fixes for the branch
    pub supported: bool,
}

impl ReleaseBranch {
    pub fn new(branch: impl Into<String>, latest_version: impl Into<String>, supported: bool) -> Self {
        Self {
            branch: branch.into(),
            latest_version: latest_version.into(),
            supported,
        }
    }
}

/// A downloadable release archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePackage {
    pub url: String,
    pub filename: String,
}

/// Packages keyed by version.
pub type ReleasePackages = BTreeMap<String, ReleasePackage>;

/// Source of release metadata for one CMS family.
#[async_trait]
pub trait ReleaseMetadataProvider: Send + Sync {
    /// Family name as used in the signature and candidate databases.
    fn family(&self) -> &'static str;

    /// Latest version and support status of every branch, in upstream order.
    async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError>;

    /// Every downloadable release, keyed by version.
    async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError>;
}

/// Release metadata providers keyed by family name.
pub struct ReleaseRegistry {
    providers: BTreeMap<&'static str, Box<dyn ReleaseMetadataProvider>>,
}

impl ReleaseRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Creates a registry with the upstream providers of every built-in family.
    pub fn with_defaults(client: reqwest::Client) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DrupalReleases::new(client.clone())));
        registry.register(Box::new(JoomlaReleases::new(client.clone())));
        registry.register(Box::new(Typo3Releases::new(client.clone())));
        registry.register(Box::new(WordpressReleases::new(client)));
        registry
    }

    /// Adds a provider, replacing any provider of the same family.
    pub fn register(&mut self, provider: Box<dyn ReleaseMetadataProvider>) {
        self.providers.insert(provider.family(), provider);
    }

    pub fn get(&self, family: &str) -> Option<&dyn ReleaseMetadataProvider> {
        self.providers.get(family).map(|p| p.as_ref())
    }

    /// Like `get`, but an unknown family is an error.
    pub fn require(&self, family: &str) -> Result<&dyn ReleaseMetadataProvider, ReleaseError> {
        self.get(family)
            .ok_or_else(|| ReleaseError::UnknownFamily(family.to_string()))
    }

    pub fn families(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }
}

impl Default for ReleaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticReleases;

    #[async_trait]
    impl ReleaseMetadataProvider for StaticReleases {
        fn family(&self) -> &'static str {
            "Drupal"
        }

        async fn latest_branches(&self) -> Result<Vec<ReleaseBranch>, ReleaseError> {
            Ok(vec![ReleaseBranch::new("7.0", "7.99", true)])
        }

        async fn downloadable_packages(&self) -> Result<ReleasePackages, ReleaseError> {
            Ok(ReleasePackages::new())
        }
    }

    #[test]
    fn test_registry_defaults_cover_builtin_families() {
        let registry = ReleaseRegistry::with_defaults(reqwest::Client::new());
        let families: Vec<&str> = registry.families().collect();
        assert_eq!(families, vec!["Drupal", "Joomla", "Typo3", "Wordpress"]);
        assert!(registry.get("Wordpress").is_some());
        assert!(registry.get("Magento").is_none());
        assert!(matches!(
            registry.require("Magento"),
            Err(ReleaseError::UnknownFamily(ref name)) if name == "Magento"
        ));
    }

    #[tokio::test]
    async fn test_register_replaces_provider() {
        let mut registry = ReleaseRegistry::with_defaults(reqwest::Client::new());
        registry.register(Box::new(StaticReleases));

        let provider = registry.get("Drupal").expect("Drupal registered");
        let branches = provider.latest_branches().await.expect("static branches");
        assert_eq!(branches, vec![ReleaseBranch::new("7.0", "7.99", true)]);
    }
}
