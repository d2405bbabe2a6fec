//! HTTP client for the Open Liberty feature registry on Maven Central.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{RemoteFeatureSource, SourceError};
use crate::models::Feature;

/// Base URL of the `io.openliberty.features:features` artifact.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://repo1.maven.org/maven2/io/openliberty/features/features";

/// Artifact id used in the per-release file name.
pub const DEFAULT_ARTIFACT: &str = "features";

/// Reads `<base>/<version>/<artifact>-<version>.json`.
#[derive(Debug, Clone)]
pub struct MavenRegistry {
    base_url: String,
    artifact: String,
    client: Client,
}

impl MavenRegistry {
    /// Create with explicit configuration. `timeout` bounds each request.
    pub fn new(
        base_url: impl Into<String>,
        artifact: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            artifact: artifact.into(),
            client,
        })
    }

    /// URL of the feature list for `version`.
    pub fn url_for(&self, version: &str) -> String {
        format!(
            "{}/{}/{}-{}.json",
            self.base_url, version, self.artifact, version
        )
    }
}

#[async_trait]
impl RemoteFeatureSource for MavenRegistry {
    fn name(&self) -> &'static str {
        "maven-registry"
    }

    async fn fetch(&self, version: &str) -> Result<Vec<Feature>, SourceError> {
        let url = self.url_for(version);
        tracing::info!("Fetching features for version {} from {}", version, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
