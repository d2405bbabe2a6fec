//! The one entry point the editing layer talks to.
//!
//! A query starts from the URI of a `server.xml`. The facade guesses the
//! owning `pom.xml`, asks the [`BuildFileIndex`] for its Liberty release and
//! hands that to the [`FeatureCatalog`]. Every query produces an answer: an
//! unknown release, a slow network or a broken build all end up at the bundled
//! feature set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build_files::{BuildFileIndex, MavenVersionResolver};
use crate::catalog::FeatureCatalog;
use crate::config::{FetchPolicy, Settings};
use crate::models::{is_pom_xml, Feature, WorkspaceFolder};
use crate::sources::{BundledDataset, MavenRegistry, SourceError};
use crate::workspace::{uri_to_path, WorkspaceResolver};

/// Directory segment the build descriptor sits next to.
const SOURCE_DIR_MARKER: &str = "/src/";

#[derive(Clone)]
pub struct VersionFeatureFacade {
    workspace: Arc<WorkspaceResolver>,
    build_files: Arc<BuildFileIndex>,
    catalog: Arc<FeatureCatalog>,
}

impl VersionFeatureFacade {
    pub fn new(
        workspace: Arc<WorkspaceResolver>,
        build_files: Arc<BuildFileIndex>,
        catalog: Arc<FeatureCatalog>,
    ) -> Self {
        Self {
            workspace,
            build_files,
            catalog,
        }
    }

    /// Wire the production sources: Maven Central, the bundled dataset and
    /// the Liberty Maven Plugin.
    pub fn from_settings(settings: &Settings) -> Result<Self, SourceError> {
        let registry = MavenRegistry::new(
            settings.registry_url.clone(),
            settings.feature_artifact.clone(),
            settings.http_timeout(),
        )?;
        let resolver = MavenVersionResolver::new(
            settings.maven_command.clone(),
            settings.version_goal.clone(),
            settings.tool_timeout(),
        );

        Ok(Self::new(
            Arc::new(WorkspaceResolver::default()),
            Arc::new(BuildFileIndex::new(Arc::new(resolver))),
            Arc::new(FeatureCatalog::new(
                Arc::new(registry),
                Arc::new(BundledDataset),
            )),
        ))
    }

    pub fn workspace(&self) -> &WorkspaceResolver {
        &self.workspace
    }

    pub fn build_files(&self) -> &BuildFileIndex {
        &self.build_files
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    // ============================================================
    // Session lifecycle
    // ============================================================

    /// Register the session's folders and index the build files in each.
    pub async fn initialize(&self, folders: Vec<WorkspaceFolder>) {
        self.workspace.set_workspace_folders(folders.clone());
        for folder in &folders {
            self.scan_folder(folder).await;
        }
    }

    /// Swap in a new folder list. Folders not seen before are scanned;
    /// descriptors already indexed are kept.
    pub async fn workspace_folders_changed(&self, folders: Vec<WorkspaceFolder>) {
        let previous = self.workspace.workspace_folders();
        self.workspace.set_workspace_folders(folders.clone());
        for folder in folders.iter().filter(|f| !previous.contains(f)) {
            self.scan_folder(folder).await;
        }
    }

    async fn scan_folder(&self, folder: &WorkspaceFolder) {
        match folder.path() {
            Some(root) => {
                self.build_files.scan(&root).await;
            }
            None => tracing::warn!("Skipping workspace folder {}: not a local path", folder.uri),
        }
    }

    /// Called when a document is saved. Re-resolves the version of indexed
    /// `pom.xml` files; returns whether the stored version changed.
    pub async fn build_file_saved(&self, uri: &str) -> bool {
        if !is_pom_xml(uri) {
            return false;
        }
        match uri_to_path(uri) {
            Some(path) => self.build_files.refresh(&path).await,
            None => false,
        }
    }

    // ============================================================
    // Version resolution
    // ============================================================

    /// Build descriptor expected for a configuration file: everything from
    /// the last `src/` segment on is replaced by the descriptor file name.
    pub fn candidate_build_file(&self, config_uri: &str) -> Option<PathBuf> {
        let index = config_uri.rfind(SOURCE_DIR_MARKER)?;
        let candidate = format!(
            "{}/{}",
            &config_uri[..index],
            self.build_files.file_name()
        );
        uri_to_path(&candidate)
    }

    /// Liberty release of the project owning `config_uri`, if known.
    ///
    /// Tries the candidate next to `src/` first. When there is none, or it is
    /// neither indexed nor on disk, falls back to the most recently modified
    /// build file in the owning workspace folder.
    pub async fn version_for(&self, config_uri: &str) -> Option<String> {
        if let Some(candidate) = self.candidate_build_file(config_uri) {
            if self.build_files.contains(&candidate) || is_file(&candidate).await {
                return self.build_files.ensure(&candidate).await;
            }
        }

        let nearest = self
            .workspace
            .find_file_in_workspace(config_uri, self.build_files.file_name())?;
        tracing::debug!(
            "Using nearest build file {} for {}",
            nearest.display(),
            config_uri
        );
        self.build_files.ensure(&nearest).await
    }

    // ============================================================
    // Feature queries
    // ============================================================

    /// Features available to the project owning `config_uri`.
    pub async fn features_for(&self, config_uri: &str, policy: &FetchPolicy) -> Arc<Vec<Feature>> {
        let lookup = async {
            let version = self.version_for(config_uri).await;
            self.features_unbounded(version.as_deref(), policy).await
        };
        self.bounded(lookup, policy).await
    }

    /// Features for an explicit release; `None` means the default set.
    pub async fn features_for_version(
        &self,
        version: Option<&str>,
        policy: &FetchPolicy,
    ) -> Arc<Vec<Feature>> {
        self.bounded(self.features_unbounded(version, policy), policy)
            .await
    }

    pub async fn get_feature(
        &self,
        name: &str,
        config_uri: &str,
        policy: &FetchPolicy,
    ) -> Option<Feature> {
        find(&self.features_for(config_uri, policy).await, name)
    }

    pub async fn feature_exists(&self, name: &str, config_uri: &str, policy: &FetchPolicy) -> bool {
        self.get_feature(name, config_uri, policy).await.is_some()
    }

    pub async fn get_feature_for_version(
        &self,
        name: &str,
        version: Option<&str>,
        policy: &FetchPolicy,
    ) -> Option<Feature> {
        find(&self.features_for_version(version, policy).await, name)
    }

    pub async fn feature_exists_for_version(
        &self,
        name: &str,
        version: Option<&str>,
        policy: &FetchPolicy,
    ) -> bool {
        self.get_feature_for_version(name, version, policy)
            .await
            .is_some()
    }

    async fn features_unbounded(
        &self,
        version: Option<&str>,
        policy: &FetchPolicy,
    ) -> Arc<Vec<Feature>> {
        match version {
            Some(version) => {
                self.catalog
                    .get_features(version, policy.request_delay_secs, policy.force_immediate)
                    .await
            }
            None => self.catalog.default_features(),
        }
    }

    async fn bounded<F>(&self, lookup: F, policy: &FetchPolicy) -> Arc<Vec<Feature>>
    where
        F: std::future::Future<Output = Arc<Vec<Feature>>>,
    {
        let Some(deadline) = policy.deadline else {
            return lookup.await;
        };
        match tokio::time::timeout(deadline, lookup).await {
            Ok(features) => features,
            Err(_) => {
                tracing::warn!(
                    "Feature lookup exceeded {:?}; using default features",
                    deadline
                );
                self.catalog.default_features()
            }
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

fn find(features: &[Feature], name: &str) -> Option<Feature> {
    features.iter().find(|f| f.matches(name)).cloned()
}
