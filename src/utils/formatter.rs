// src/utils/formatter.rs
use chrono::{DateTime, Local, Utc};

use crate::error::FsError;
use crate::filesystem::PathNode;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_modified(modified: Option<DateTime<Utc>>) -> String {
    match modified {
        Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// Right-hand side of the status bar: item count, or why there are none.
pub fn listing_status(entries: usize, error: Option<&FsError>) -> String {
    match error {
        Some(err) => err.label().to_string(),
        None if entries == 1 => "1 item".to_string(),
        None => format!("{} items", entries),
    }
}

pub fn describe_node(node: &PathNode) -> Vec<String> {
    let mut lines = vec![
        format!("Name: {}", node.name()),
        format!("Modified: {}", format_modified(node.modified())),
    ];
    if node.is_directory() {
        lines.push("Type: directory".to_string());
    } else {
        lines.push(format!("Size: {} ({} bytes)", format_size(node.size()), node.size()));
        if let Some(ext) = node.extension() {
            lines.push(format!("Type: .{} file", ext));
        }
    }
    if node.is_symlink() {
        lines.push("Symbolic link".to_string());
    }
    lines
}
