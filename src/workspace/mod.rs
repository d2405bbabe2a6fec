//! Attributes configuration files to workspace folders.

mod uri;

pub use uri::{path_to_uri, uri_to_path};

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::models::WorkspaceFolder;

/// The workspace folders of the current editing session.
///
/// The list only ever changes by a full swap. Lookups walk it in registration
/// order, so when folders nest the one registered first wins.
#[derive(Debug, Default)]
pub struct WorkspaceResolver {
    folders: RwLock<Vec<WorkspaceFolder>>,
}

impl WorkspaceResolver {
    pub fn new(folders: Vec<WorkspaceFolder>) -> Self {
        Self {
            folders: RwLock::new(folders),
        }
    }

    pub fn set_workspace_folders(&self, folders: Vec<WorkspaceFolder>) {
        *self.folders.write().unwrap_or_else(PoisonError::into_inner) = folders;
    }

    pub fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// First registered folder containing `file_uri`.
    pub fn folder_for(&self, file_uri: &str) -> Option<WorkspaceFolder> {
        let file_path = uri_to_path(file_uri);
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|folder| contains(folder, file_uri, file_path.as_deref()))
            .cloned()
    }

    /// Locate a file whose name ends with `file_name` inside the folder that
    /// owns `file_uri`.
    ///
    /// With several candidates the most recently modified one wins. Directory
    /// entries are visited in file-name order and the first candidate seen
    /// keeps the spot on equal modification times.
    pub fn find_file_in_workspace(&self, file_uri: &str, file_name: &str) -> Option<PathBuf> {
        let folder = self.folder_for(file_uri)?;
        let root = folder.path()?;

        let mut newest: Option<(PathBuf, Option<SystemTime>)> = None;
        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file()
                || !entry.file_name().to_string_lossy().ends_with(file_name)
            {
                continue;
            }
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            let replace = match &newest {
                None => true,
                Some((_, best)) => modified > *best,
            };
            if replace {
                newest = Some((entry.into_path(), modified));
            }
        }

        newest.map(|(path, _)| path)
    }
}

fn contains(folder: &WorkspaceFolder, file_uri: &str, file_path: Option<&Path>) -> bool {
    match (folder.path(), file_path) {
        (Some(root), Some(file)) => file.starts_with(root),
        _ => file_uri.starts_with(&folder.uri),
    }
}
