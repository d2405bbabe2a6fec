use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A build descriptor discovered in a workspace.
///
/// `version` stays `None` until Maven has reported a Liberty release for the
/// file at least once. Entries are replaced as a whole on refresh and are never
/// removed, even if the file disappears from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Absolute path to the `pom.xml`.
    pub path: PathBuf,
    pub version: Option<String>,
}

impl BuildDescriptor {
    pub fn new(path: impl Into<PathBuf>, version: Option<String>) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }
}
