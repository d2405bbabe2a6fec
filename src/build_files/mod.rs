//! Index of build descriptors and the Liberty release each one targets.

mod maven;

pub use maven::{
    parse_version_output, MavenVersionResolver, ResolveError, VersionOutput, VersionResolver,
    DEFAULT_MAVEN_COMMAND, DEFAULT_VERSION_GOAL, GOAL_UNSUPPORTED_MARKER, VERSION_MARKER,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use walkdir::WalkDir;

use crate::models::{BuildDescriptor, POM_XML};

/// Maps each discovered `pom.xml` to the release Maven reported for it.
///
/// A failed resolution never erases an earlier success: the previous version
/// for that path is kept. Entries are replaced whole under the write lock, so
/// readers see either the old descriptor or the new one.
pub struct BuildFileIndex {
    resolver: Arc<dyn VersionResolver>,
    file_name: String,
    entries: RwLock<HashMap<PathBuf, BuildDescriptor>>,
}

impl BuildFileIndex {
    pub fn new(resolver: Arc<dyn VersionResolver>) -> Self {
        Self {
            resolver,
            file_name: POM_XML.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Index files named `file_name` instead of `pom.xml`.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, BuildDescriptor>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, BuildDescriptor>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find every build descriptor under `root` and record its version.
    ///
    /// Unreadable sub-directories are skipped. If the root itself cannot be
    /// read the scan stops with a warning. Returns the number of descriptors
    /// recorded.
    pub async fn scan(&self, root: &Path) -> usize {
        let files = match self.discover(root) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Unable to get build files under {}: {}", root.display(), e);
                return 0;
            }
        };

        for path in &files {
            let version = self.resolve_version(path).await;
            self.write()
                .insert(path.clone(), BuildDescriptor::new(path.clone(), version));
        }
        tracing::info!(
            "Indexed {} build file(s) under {}",
            files.len(),
            root.display()
        );
        files.len()
    }

    fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && entry.file_name() == self.file_name.as_str() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Ask the resolver for the version of `path`, falling back to the last
    /// known version for that path when the resolver fails or reports nothing.
    pub async fn resolve_version(&self, path: &Path) -> Option<String> {
        let previous = self.lookup(path);
        match self.resolver.resolve(path).await {
            Ok(Some(version)) => Some(version),
            Ok(None) => {
                tracing::debug!("No Liberty version reported for {}", path.display());
                previous
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to resolve Liberty version for {}: {}. Keeping {}",
                    path.display(),
                    e,
                    previous.as_deref().unwrap_or("no version")
                );
                previous
            }
        }
    }

    /// Re-resolve a descriptor that is already indexed.
    ///
    /// Unknown paths are ignored. Returns `true` when the stored version changed.
    pub async fn refresh(&self, path: &Path) -> bool {
        let Some(existing) = self.read().get(path).map(|d| d.version.clone()) else {
            tracing::debug!("Ignoring refresh of unindexed build file {}", path.display());
            return false;
        };

        let version = self.resolve_version(path).await;
        if version == existing {
            return false;
        }

        tracing::info!(
            "Liberty version of {} changed from {:?} to {:?}",
            path.display(),
            existing,
            version
        );
        self.write()
            .insert(path.to_path_buf(), BuildDescriptor::new(path, version));
        true
    }

    /// Record `path` if it is not indexed yet and return its version.
    pub async fn ensure(&self, path: &Path) -> Option<String> {
        if let Some(descriptor) = self.read().get(path) {
            return descriptor.version.clone();
        }
        let version = self.resolve_version(path).await;
        self.write()
            .entry(path.to_path_buf())
            .or_insert_with(|| BuildDescriptor::new(path, version))
            .version
            .clone()
    }

    pub fn lookup(&self, path: &Path) -> Option<String> {
        self.read().get(path).and_then(|d| d.version.clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.read().contains_key(path)
    }

    /// Snapshot of all descriptors, sorted by path.
    pub fn descriptors(&self) -> Vec<BuildDescriptor> {
        let mut descriptors: Vec<BuildDescriptor> = self.read().values().cloned().collect();
        descriptors.sort_by(|a, b| a.path.cmp(&b.path));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
