// src/utils/mod.rs
pub mod formatter;

pub use formatter::{describe_node, format_modified, format_size, listing_status};
