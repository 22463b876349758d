// src/filesystem/memory.rs
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{FileSystem, PathNode};
use crate::error::{FsError, FsResult};

#[derive(Debug, Clone)]
enum MemoryEntry {
    File { data: Vec<u8>, modified: DateTime<Utc> },
    Directory { modified: DateTime<Utc> },
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<PathBuf, MemoryEntry>,
    denied: BTreeSet<PathBuf>,
    mounts: BTreeSet<PathBuf>,
}

impl MemoryState {
    fn node(&self, path: &Path) -> FsResult<PathNode> {
        match self.entries.get(path) {
            Some(MemoryEntry::File { data, modified }) => {
                Ok(PathNode::new(path.to_path_buf(), false, data.len() as u64, Some(*modified)))
            }
            Some(MemoryEntry::Directory { modified }) => {
                Ok(PathNode::new(path.to_path_buf(), true, 0, Some(*modified)))
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.get(path), Some(MemoryEntry::Directory { .. }))
    }

    fn check_allowed(&self, path: &Path) -> FsResult<()> {
        if self.denied.contains(path) {
            return Err(FsError::AccessDenied(path.to_path_buf()));
        }
        Ok(())
    }

    /// Creating or removing `path` writes to its parent directory.
    fn check_parent_writable(&self, path: &Path) -> FsResult<()> {
        let parent = path.parent().ok_or_else(|| FsError::InvalidTarget {
            path: path.to_path_buf(),
            reason: "path has no parent",
        })?;
        if !self.is_dir(parent) {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        self.check_allowed(parent)
    }

    fn children(&self, path: &Path) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|key| key.parent() == Some(path))
            .cloned()
            .collect()
    }

    fn device_of(&self, path: &Path) -> Option<PathBuf> {
        self.mounts
            .iter()
            .filter(|mount| path.starts_with(mount))
            .max_by_key(|mount| mount.components().count())
            .cloned()
    }
}

/// In-memory filesystem for tests and previews.
///
/// Paths are used as given, so callers should pass absolute, normalized paths.
/// `deny` simulates permission errors and `mount` simulates a separate device.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.entries.insert(PathBuf::from("/"), MemoryEntry::Directory { modified: Utc::now() });
        MemoryFs { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a directory and any missing parents.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        {
            let mut state = self.lock();
            let now = Utc::now();
            for ancestor in path.as_ref().ancestors() {
                if ancestor.as_os_str().is_empty() {
                    continue;
                }
                state
                    .entries
                    .entry(ancestor.to_path_buf())
                    .or_insert(MemoryEntry::Directory { modified: now });
            }
        }
        self
    }

    /// Insert a file with contents, creating missing parents.
    pub fn with_file(self, path: impl AsRef<Path>, contents: &[u8]) -> Self {
        let path = path.as_ref();
        let fs = match path.parent() {
            Some(parent) => self.with_dir(parent),
            None => self,
        };
        fs.lock().entries.insert(
            path.to_path_buf(),
            MemoryEntry::File { data: contents.to_vec(), modified: Utc::now() },
        );
        fs
    }

    pub fn deny(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(path.as_ref().to_path_buf());
    }

    pub fn allow(&self, path: impl AsRef<Path>) {
        self.lock().denied.remove(path.as_ref());
    }

    /// Treat `path` and everything below it as a separate filesystem.
    pub fn mount(&self, path: impl AsRef<Path>) {
        self.lock().mounts.insert(path.as_ref().to_path_buf());
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MemoryEntry::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().is_dir(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSystem for MemoryFs {
    fn stat(&self, path: &Path) -> FsResult<PathNode> {
        let state = self.lock();
        // looking up an entry needs access to the directory holding it
        if let Some(parent) = path.parent() {
            state.check_allowed(parent)?;
        }
        state.node(path)
    }

    fn read_dir(&self, path: &Path) -> FsResult<Vec<PathNode>> {
        let state = self.lock();
        if !state.is_dir(path) {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        state.check_allowed(path)?;
        state.children(path).iter().map(|child| state.node(child)).collect()
    }

    fn create_file(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        if state.entries.contains_key(path) {
            return Err(FsError::AlreadyExists(path.to_path_buf()));
        }
        state.check_parent_writable(path)?;
        state
            .entries
            .insert(path.to_path_buf(), MemoryEntry::File { data: Vec::new(), modified: Utc::now() });
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        if state.entries.contains_key(path) {
            return Err(FsError::AlreadyExists(path.to_path_buf()));
        }
        state.check_parent_writable(path)?;
        state.entries.insert(path.to_path_buf(), MemoryEntry::Directory { modified: Utc::now() });
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        match state.entries.get(path) {
            None => return Err(FsError::NotFound(path.to_path_buf())),
            Some(MemoryEntry::Directory { .. }) => {
                return Err(FsError::InvalidTarget { path: path.to_path_buf(), reason: "is a directory" });
            }
            Some(MemoryEntry::File { .. }) => {}
        }
        state.check_allowed(path)?;
        state.check_parent_writable(path)?;
        state.entries.remove(path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        if !state.is_dir(path) {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        state.check_allowed(path)?;
        state.check_parent_writable(path)?;
        if !state.children(path).is_empty() {
            return Err(FsError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("directory not empty"),
            });
        }
        state.entries.remove(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        let mut state = self.lock();
        if !state.entries.contains_key(from) {
            return Err(FsError::NotFound(from.to_path_buf()));
        }
        if state.device_of(from) != state.device_of(to) {
            return Err(FsError::CrossDeviceUnsupported { from: from.to_path_buf(), to: to.to_path_buf() });
        }
        state.check_parent_writable(from)?;
        state.check_parent_writable(to)?;

        let moved: Vec<PathBuf> = state.entries.keys().filter(|key| key.starts_with(from)).cloned().collect();
        for old in moved {
            if let Some(entry) = state.entries.remove(&old) {
                let suffix = old.strip_prefix(from).unwrap_or(Path::new(""));
                let new = if suffix.as_os_str().is_empty() { to.to_path_buf() } else { to.join(suffix) };
                state.entries.insert(new, entry);
            }
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> FsResult<u64> {
        let mut state = self.lock();
        let data = match state.entries.get(from) {
            Some(MemoryEntry::File { data, .. }) => data.clone(),
            Some(MemoryEntry::Directory { .. }) => {
                return Err(FsError::InvalidTarget { path: from.to_path_buf(), reason: "is a directory" });
            }
            None => return Err(FsError::NotFound(from.to_path_buf())),
        };
        state.check_allowed(from)?;
        state.check_parent_writable(to)?;
        let len = data.len() as u64;
        state.entries.insert(to.to_path_buf(), MemoryEntry::File { data, modified: Utc::now() });
        Ok(len)
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        // no symlinks here, so every existing path is already canonical
        if self.lock().entries.contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(FsError::NotFound(path.to_path_buf()))
        }
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> FsResult<Vec<u8>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MemoryEntry::File { data, .. }) => {
                state.check_allowed(path)?;
                Ok(data.iter().take(limit).copied().collect())
            }
            Some(MemoryEntry::Directory { .. }) => {
                Err(FsError::InvalidTarget { path: path.to_path_buf(), reason: "is a directory" })
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }
}
