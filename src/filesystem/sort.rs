// src/filesystem/sort.rs
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::PathNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    Size,
    Modified,
    Type,
}

impl SortBy {
    pub fn next(self) -> Self {
        match self {
            SortBy::Name => SortBy::Size,
            SortBy::Size => SortBy::Modified,
            SortBy::Modified => SortBy::Type,
            SortBy::Type => SortBy::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Size => "size",
            SortBy::Modified => "modified",
            SortBy::Type => "type",
        }
    }
}

/// Directories first, then case-folded name, then the raw name so that
/// names differing only in case still have a fixed order.
pub fn compare_by_name(a: &PathNode, b: &PathNode) -> Ordering {
    directories_first(a, b)
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

fn directories_first(a: &PathNode, b: &PathNode) -> Ordering {
    b.is_directory().cmp(&a.is_directory())
}

pub fn compare(a: &PathNode, b: &PathNode, sort_by: SortBy) -> Ordering {
    let primary = match sort_by {
        SortBy::Name => Ordering::Equal,
        SortBy::Size => b.size().cmp(&a.size()),
        SortBy::Modified => b.modified().cmp(&a.modified()),
        SortBy::Type => a.extension().cmp(&b.extension()),
    };
    directories_first(a, b)
        .then(primary)
        .then_with(|| compare_by_name(a, b))
}

pub fn sort_nodes(nodes: &mut [PathNode], sort_by: SortBy) {
    nodes.sort_by(|a, b| compare(a, b, sort_by));
}
