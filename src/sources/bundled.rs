use super::{DefaultFeatureSource, SourceError};
use crate::models::{Feature, DEFAULT_LIBERTY_VERSION};

const BUNDLED_FEATURES: &str = include_str!("../../resources/features-20.0.0.9.json");

/// The feature list compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDataset;

impl DefaultFeatureSource for BundledDataset {
    fn version(&self) -> &str {
        DEFAULT_LIBERTY_VERSION
    }

    fn load(&self) -> Result<Vec<Feature>, SourceError> {
        Ok(serde_json::from_str(BUNDLED_FEATURES)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_parses() {
        let features = BundledDataset.load().unwrap();
        assert!(!features.is_empty());
        assert!(features.iter().any(|f| f.matches("servlet-4.0") && f.is_public()));
    }

    #[test]
    fn bundled_dataset_contains_non_public_entries() {
        let features = BundledDataset.load().unwrap();
        assert!(features.iter().any(|f| !f.is_public()));
    }
}
