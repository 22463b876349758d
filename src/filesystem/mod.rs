// src/filesystem/mod.rs
pub mod dir;
pub mod file;
pub mod host;
pub mod memory;
pub mod sort;

pub use dir::{list_directory, list_directory_by, read_directory_node, DirectoryNode, Navigator};
pub use file::PathNode;
pub use host::HostFs;
pub use memory::MemoryFs;
pub use sort::SortBy;

use std::path::{Path, PathBuf};

use crate::error::{FsError, FsResult};

/// Primitive filesystem access used by the listing service and the file
/// operations. Each method is a single step; recursion, sorting and collision
/// policy live above it so every backend behaves the same.
pub trait FileSystem: Send + Sync {
    /// Snapshot of `path` itself. `is_directory` follows symlinks, `is_symlink`
    /// describes the entry.
    fn stat(&self, path: &Path) -> FsResult<PathNode>;

    /// Direct children of a directory, unsorted. A child whose metadata cannot
    /// be read is still listed, with its size and modification time unknown.
    fn read_dir(&self, path: &Path) -> FsResult<Vec<PathNode>>;

    /// Create an empty file, failing if anything exists at `path`.
    fn create_file(&self, path: &Path) -> FsResult<()>;

    /// Create one directory level, failing if anything exists at `path`.
    fn create_dir(&self, path: &Path) -> FsResult<()>;

    /// Remove a non-directory entry (files and symlinks).
    fn remove_file(&self, path: &Path) -> FsResult<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> FsResult<()>;

    /// Rename without fallback. Crossing a filesystem boundary yields
    /// `FsError::CrossDeviceUnsupported`.
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Copy a single non-directory entry, returning the bytes written.
    fn copy_file(&self, from: &Path, to: &Path) -> FsResult<u64>;

    /// Absolute path of an existing entry with every symlink resolved.
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf>;

    /// Up to `limit` bytes from the start of a file.
    fn read_prefix(&self, path: &Path, limit: usize) -> FsResult<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool {
        !matches!(self.stat(path), Err(FsError::NotFound(_)))
    }
}
