use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PUBLIC_VISIBILITY;

/// A Liberty feature as published in a release's `features-<version>.json`.
///
/// Only the fields the catalog looks at are typed. Everything else in the
/// registry document (`version`, `type`, provider data, unknown keys) is kept in
/// `extra` and passed through unexamined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    /// Fully qualified symbolic name, e.g. `com.ibm.websphere.appserver.servlet-4.0`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub wlp_information: WlpInformation,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `wlpInformation` block of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WlpInformation {
    /// Name users write inside `<featureManager><feature>`, e.g. `servlet-4.0`.
    pub short_name: String,
    pub visibility: Visibility,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who may reference a feature.
///
/// Values the registry may add later deserialize as `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Install,
    #[serde(other)]
    Other,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => PUBLIC_VISIBILITY,
            Self::Private => "PRIVATE",
            Self::Protected => "PROTECTED",
            Self::Install => "INSTALL",
            Self::Other => "OTHER",
        }
    }
}

impl Feature {
    pub fn short_name(&self) -> &str {
        &self.wlp_information.short_name
    }

    pub fn is_public(&self) -> bool {
        self.wlp_information.visibility == Visibility::Public
    }

    /// Case-insensitive match against the feature's short name.
    pub fn matches(&self, name: &str) -> bool {
        self.short_name().eq_ignore_ascii_case(name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }
}

/// Keep only `PUBLIC` features, preserving source order and duplicates.
pub fn public_only(features: Vec<Feature>) -> Vec<Feature> {
    features.into_iter().filter(Feature::is_public).collect()
}
