// src/error.rs
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

/// Failure of a single listing or file operation.
///
/// Every variant is local to the call that produced it; no error here leaves
/// history or listings in an inconsistent state.
#[derive(Debug, Error)]
pub enum FsError {
    /// Permission refused by the OS.
    #[error("Access denied: {}", .0.display())]
    AccessDenied(PathBuf),

    /// Path is missing, or is not the kind of entry the operation needs.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Something already occupies the target path.
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// An atomic rename is impossible because the paths live on different filesystems.
    #[error("Cannot move {} to {} across filesystems", .from.display(), .to.display())]
    CrossDeviceUnsupported { from: PathBuf, to: PathBuf },

    /// A recursive copy or delete stopped after `completed` entries were processed.
    #[error("Operation on {} stopped after {completed} entries: {source}", .path.display())]
    PartialFailure {
        path: PathBuf,
        completed: usize,
        #[source]
        source: Box<FsError>,
    },

    #[error("Invalid target {}: {reason}", .path.display())]
    InvalidTarget { path: PathBuf, reason: &'static str },

    /// Another mutation is already running against an overlapping subtree.
    #[error("Busy: {} is being modified", .0.display())]
    Busy(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Map an OS error for `path` onto the taxonomy.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => FsError::AccessDenied(path),
            io::ErrorKind::NotFound => FsError::NotFound(path),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path),
            _ if is_not_a_directory(&err) => FsError::NotFound(path),
            _ => FsError::Io { path, source: err },
        }
    }

    pub fn partial(path: &Path, completed: usize, source: FsError) -> Self {
        FsError::PartialFailure { path: path.to_path_buf(), completed, source: Box::new(source) }
    }

    /// Listing failures the UI shows as a status instead of an empty directory.
    pub fn is_recoverable_listing(&self) -> bool {
        matches!(self, FsError::AccessDenied(_) | FsError::NotFound(_))
    }

    /// Short label for a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            FsError::AccessDenied(_) => "Access Denied",
            FsError::NotFound(_) => "Not Found",
            FsError::AlreadyExists(_) => "Already Exists",
            FsError::CrossDeviceUnsupported { .. } => "Cross-device move unsupported",
            FsError::PartialFailure { .. } => "Partially completed",
            FsError::InvalidTarget { .. } => "Invalid target",
            FsError::Busy(_) => "Busy",
            FsError::Io { .. } => "I/O error",
        }
    }
}

#[cfg(unix)]
fn is_not_a_directory(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOTDIR)
}

#[cfg(not(unix))]
fn is_not_a_directory(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotADirectory
}

/// True when a rename failed because source and target are on different devices.
#[cfg(unix)]
pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}
