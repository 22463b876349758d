// src/filesystem/file.rs
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Read-only snapshot of one filesystem entry.
///
/// Built fresh by every listing call and never updated afterwards; re-list to
/// observe changes on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    name: String,
    path: PathBuf,
    is_directory: bool,
    is_symlink: bool,
    size: u64,
    modified: Option<DateTime<Utc>>,
}

impl PathNode {
    pub fn new(path: PathBuf, is_directory: bool, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        // directory sizes are not recursed at listing time
        let size = if is_directory { 0 } else { size };
        PathNode { name, path, is_directory, is_symlink: false, size, modified }
    }

    pub fn with_symlink(mut self, is_symlink: bool) -> Self {
        self.is_symlink = is_symlink;
        self
    }

    pub fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        PathNode::new(path, metadata.is_dir(), metadata.len(), modified)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Directory that recursive operations may descend into.
    pub fn is_traversable(&self) -> bool {
        self.is_directory && !self.is_symlink
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn extension(&self) -> Option<String> {
        if self.is_directory {
            return None;
        }
        self.path.extension().map(|e| e.to_string_lossy().to_lowercase())
    }
}
