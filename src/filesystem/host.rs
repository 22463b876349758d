// src/filesystem/host.rs
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FileSystem, PathNode};
use crate::error::{is_cross_device, FsError, FsResult};

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl HostFs {
    pub fn new() -> Self {
        HostFs
    }
}

fn node_for(path: &Path) -> FsResult<PathNode> {
    let link_meta = fs::symlink_metadata(path).map_err(|e| FsError::from_io(path, e))?;
    if !link_meta.file_type().is_symlink() {
        return Ok(PathNode::from_metadata(path.to_path_buf(), &link_meta));
    }
    // dangling links are still listed, as non-directories
    let node = match fs::metadata(path) {
        Ok(target) => PathNode::from_metadata(path.to_path_buf(), &target),
        Err(_) => PathNode::from_metadata(path.to_path_buf(), &link_meta),
    };
    Ok(node.with_symlink(true))
}

impl FileSystem for HostFs {
    fn stat(&self, path: &Path) -> FsResult<PathNode> {
        node_for(path)
    }

    fn read_dir(&self, path: &Path) -> FsResult<Vec<PathNode>> {
        let metadata = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(FsError::NotFound(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // the directory itself could not be opened
                Err(err) if err.depth() == 0 => {
                    return Err(match err.into_io_error() {
                        Some(io) => FsError::from_io(path, io),
                        None => FsError::AccessDenied(path.to_path_buf()),
                    });
                }
                Err(err) => {
                    tracing::debug!("skipping unreadable entry in {}: {}", path.display(), err);
                    continue;
                }
            };
            // readable but not searchable directories still give names and types
            let node = match node_for(entry.path()) {
                Ok(node) => node,
                Err(err) => {
                    tracing::debug!("no metadata for {}: {}", entry.path().display(), err);
                    let file_type = entry.file_type();
                    PathNode::new(entry.path().to_path_buf(), file_type.is_dir(), 0, None)
                        .with_symlink(file_type.is_symlink())
                }
            };
            entries.push(node);
        }
        Ok(entries)
    }

    fn create_file(&self, path: &Path) -> FsResult<()> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| FsError::from_io(path, e))
    }

    fn create_dir(&self, path: &Path) -> FsResult<()> {
        fs::create_dir(path).map_err(|e| FsError::from_io(path, e))
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        fs::remove_file(path).map_err(|e| FsError::from_io(path, e))
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        fs::remove_dir(path).map_err(|e| FsError::from_io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        fs::rename(from, to).map_err(|e| {
            if is_cross_device(&e) {
                FsError::CrossDeviceUnsupported { from: from.to_path_buf(), to: to.to_path_buf() }
            } else {
                match FsError::from_io(from, e) {
                    FsError::NotFound(_) if fs::symlink_metadata(from).is_ok() => FsError::NotFound(to.to_path_buf()),
                    other => other,
                }
            }
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> FsResult<u64> {
        let link_meta = fs::symlink_metadata(from).map_err(|e| FsError::from_io(from, e))?;
        if link_meta.file_type().is_symlink() {
            return copy_symlink(from, to);
        }
        fs::copy(from, to).map_err(|e| FsError::from_io(from, e))
    }

    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf> {
        fs::canonicalize(path).map_err(|e| FsError::from_io(path, e))
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> FsResult<Vec<u8>> {
        let file = fs::File::open(path).map_err(|e| FsError::from_io(path, e))?;
        let mut buf = Vec::new();
        file.take(limit as u64).read_to_end(&mut buf).map_err(|e| FsError::from_io(path, e))?;
        Ok(buf)
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> FsResult<u64> {
    let target = fs::read_link(from).map_err(|e| FsError::from_io(from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| FsError::from_io(to, e))?;
    Ok(0)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> FsResult<u64> {
    fs::copy(from, to).map_err(|e| FsError::from_io(from, e))
}
