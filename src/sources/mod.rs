//! Where feature lists come from.
//!
//! Two I/O boundaries feed the [`FeatureCatalog`](crate::catalog::FeatureCatalog):
//! the remote registry (one JSON document per Liberty release) and the dataset
//! compiled into the binary. Neither keeps state; caching and throttling are the
//! catalog's job.

mod bundled;
mod registry;

pub use bundled::BundledDataset;
pub use registry::{MavenRegistry, DEFAULT_ARTIFACT, DEFAULT_REGISTRY_URL};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Feature;

/// Feature source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed feature list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fetches the raw feature list for one Liberty release.
#[async_trait]
pub trait RemoteFeatureSource: Send + Sync {
    /// Human-readable source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch every feature published for `version`, unfiltered.
    async fn fetch(&self, version: &str) -> Result<Vec<Feature>, SourceError>;
}

/// Loads the fixed feature list shipped with the program.
pub trait DefaultFeatureSource: Send + Sync {
    /// Release the dataset describes.
    fn version(&self) -> &str;

    /// Parse the dataset, unfiltered.
    fn load(&self) -> Result<Vec<Feature>, SourceError>;
}
