use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::workspace::uri_to_path;

/// A workspace root announced by the editor host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFolder {
    /// Folder URI as sent by the host, usually `file:///...`.
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl WorkspaceFolder {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
        }
    }

    /// Local file system path of the folder, if the URI denotes one.
    pub fn path(&self) -> Option<PathBuf> {
        uri_to_path(&self.uri)
    }
}
