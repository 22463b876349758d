// src/lib.rs
//! panefm: directory listing, navigation history and file operations for a
//! terminal file browser.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod history;
pub mod ops;
pub mod preview;
pub mod ui;
pub mod utils;

pub use config::{Config, ConfigError};
pub use error::{FsError, FsResult};
pub use filesystem::{
    list_directory, list_directory_by, read_directory_node, DirectoryNode, FileSystem, HostFs, MemoryFs,
    Navigator, PathNode, SortBy,
};
pub use history::HistoryManager;
pub use ops::{
    copy_path, make_directory_recursive, remove_path_recursive, rename_path, touch_file, CopyOptions,
    OperationWorker, TransferStats,
};
