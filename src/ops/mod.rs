// src/ops/mod.rs
//! Mutating file operations.
//!
//! Each call is a single-shot change with no rollback. Recursive copies and
//! deletes can stop halfway, in which case the error is
//! `FsError::PartialFailure`; either way the caller re-lists to see what is
//! actually on disk.

pub mod worker;

pub use worker::{Completion, JobId, Operation, OperationOutput, OperationWorker};

use std::path::{Path, PathBuf};

use crate::error::{FsError, FsResult};
use crate::filesystem::sort::{sort_nodes, SortBy};
use crate::filesystem::{FileSystem, PathNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Copy a directory into an existing directory of the same name. Colliding
    /// files are still refused.
    pub merge: bool,
}

impl CopyOptions {
    pub fn merge() -> Self {
        CopyOptions { merge: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

impl TransferStats {
    pub fn entries(&self) -> usize {
        self.files + self.directories
    }
}

fn finish<T>(path: &Path, completed: usize, result: FsResult<()>, value: T) -> FsResult<T> {
    match result {
        Ok(()) => Ok(value),
        Err(err) if completed == 0 => Err(err),
        Err(err) => Err(FsError::partial(path, completed, err)),
    }
}

/// Physical location of `path`. Symlinks are resolved in the longest prefix
/// that exists; the rest is appended unchanged.
fn resolve<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<PathBuf> {
    for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
        match fs.canonicalize(ancestor) {
            Ok(base) => {
                let rest = path.strip_prefix(ancestor).unwrap_or(Path::new(""));
                return Ok(if rest.as_os_str().is_empty() { base } else { base.join(rest) });
            }
            Err(FsError::NotFound(_)) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(path.to_path_buf())
}

/// True when `dest` lies inside the directory `src`, by name or through a symlink.
fn is_inside<F: FileSystem + ?Sized>(fs: &F, src: &Path, dest: &Path) -> FsResult<bool> {
    if dest.starts_with(src) {
        return Ok(true);
    }
    let src = fs.canonicalize(src)?;
    Ok(resolve(fs, dest)?.starts_with(&src))
}

fn log_outcome<T>(action: &str, path: &Path, result: &FsResult<T>) {
    match result {
        Ok(_) => tracing::info!("{} {}", action, path.display()),
        Err(err) => tracing::warn!("{} {} failed: {}", action, path.display(), err),
    }
}

/// Copy a file, or a directory tree, from `src` to `dest`.
pub fn copy_path<F: FileSystem + ?Sized>(
    fs: &F,
    src: &Path,
    dest: &Path,
    options: CopyOptions,
) -> FsResult<TransferStats> {
    let result = copy_checked(fs, src, dest, options);
    log_outcome("copy", src, &result);
    result
}

fn copy_checked<F: FileSystem + ?Sized>(
    fs: &F,
    src: &Path,
    dest: &Path,
    options: CopyOptions,
) -> FsResult<TransferStats> {
    let node = fs.stat(src)?;
    if node.is_traversable() && is_inside(fs, src, dest)? {
        return Err(FsError::InvalidTarget { path: dest.to_path_buf(), reason: "destination is inside the source" });
    }
    let mut stats = TransferStats::default();
    let result = copy_node(fs, &node, dest, options, &mut stats);
    finish(src, stats.entries(), result, stats)
}

fn copy_node<F: FileSystem + ?Sized>(
    fs: &F,
    node: &PathNode,
    dest: &Path,
    options: CopyOptions,
    stats: &mut TransferStats,
) -> FsResult<()> {
    let existing = match fs.stat(dest) {
        Ok(existing) => Some(existing),
        Err(FsError::NotFound(_)) => None,
        Err(err) => return Err(err),
    };

    if !node.is_traversable() {
        if existing.is_some() {
            return Err(FsError::AlreadyExists(dest.to_path_buf()));
        }
        stats.bytes += fs.copy_file(node.path(), dest)?;
        stats.files += 1;
        return Ok(());
    }

    // list before creating so the new directory never shows up as a child
    let mut children = fs.read_dir(node.path())?;
    sort_nodes(&mut children, SortBy::Name);

    match existing {
        Some(existing) if options.merge && existing.is_traversable() => {}
        Some(_) => return Err(FsError::AlreadyExists(dest.to_path_buf())),
        None => {
            fs.create_dir(dest)?;
            stats.directories += 1;
        }
    }

    for child in &children {
        copy_node(fs, child, &dest.join(child.name()), options, stats)?;
    }
    Ok(())
}

/// Delete a file, or a directory and everything below it. Returns the number
/// of entries removed.
pub fn remove_path_recursive<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<usize> {
    let result = remove_checked(fs, path);
    log_outcome("remove", path, &result);
    result
}

fn remove_checked<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<usize> {
    if path.parent().is_none() {
        return Err(FsError::InvalidTarget { path: path.to_path_buf(), reason: "refusing to remove a filesystem root" });
    }
    let node = fs.stat(path)?;
    let mut removed = 0;
    let result = remove_node(fs, &node, &mut removed);
    finish(path, removed, result, removed)
}

fn remove_node<F: FileSystem + ?Sized>(fs: &F, node: &PathNode, removed: &mut usize) -> FsResult<()> {
    if node.is_traversable() {
        for child in fs.read_dir(node.path())? {
            remove_node(fs, &child, removed)?;
        }
        fs.remove_dir(node.path())?;
    } else {
        fs.remove_file(node.path())?;
    }
    *removed += 1;
    Ok(())
}

/// Rename `old` to `new`, never overwriting and never falling back to
/// copy+delete.
pub fn rename_path<F: FileSystem + ?Sized>(fs: &F, old: &Path, new: &Path) -> FsResult<()> {
    let result = rename_checked(fs, old, new);
    log_outcome("rename", old, &result);
    result
}

fn rename_checked<F: FileSystem + ?Sized>(fs: &F, old: &Path, new: &Path) -> FsResult<()> {
    let node = fs.stat(old)?;
    match fs.stat(new) {
        Ok(_) => return Err(FsError::AlreadyExists(new.to_path_buf())),
        Err(FsError::NotFound(_)) => {}
        Err(err) => return Err(err),
    }
    if node.is_traversable() && is_inside(fs, old, new)? {
        return Err(FsError::InvalidTarget { path: new.to_path_buf(), reason: "cannot move a directory into itself" });
    }
    // TODO: use renameat2(RENAME_NOREPLACE) on Linux to close the gap between the
    // existence check and the rename.
    fs.rename(old, new)
}

/// Create an empty file. Fails if anything already exists at `path`.
pub fn touch_file<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<()> {
    let result = fs.create_file(path);
    log_outcome("touch", path, &result);
    result
}

/// Create `path` and any missing parents. Succeeds when it already exists as a
/// directory.
pub fn make_directory_recursive<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<()> {
    let result = make_dirs(fs, path);
    log_outcome("mkdir", path, &result);
    result
}

fn make_dirs<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<()> {
    if path.as_os_str().is_empty() {
        return Err(FsError::InvalidTarget { path: path.to_path_buf(), reason: "empty path" });
    }
    let mut missing: Vec<&Path> = Vec::new();
    for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
        match fs.stat(ancestor) {
            Ok(node) if node.is_directory() => break,
            Ok(_) => return Err(FsError::AlreadyExists(ancestor.to_path_buf())),
            Err(FsError::NotFound(_)) => missing.push(ancestor),
            Err(err) => return Err(err),
        }
    }
    for dir in missing.into_iter().rev() {
        match fs.create_dir(dir) {
            Ok(()) => {}
            // created by someone else in the meantime
            Err(FsError::AlreadyExists(_)) if fs.stat(dir).map(|n| n.is_directory()).unwrap_or(false) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
