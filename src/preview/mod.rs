// src/preview/mod.rs
//! Plain-text preview of the highlighted file.

use crate::error::FsResult;
use crate::filesystem::{FileSystem, PathNode};

const TEXT_EXTENSIONS: [&str; 24] = [
    "txt", "md", "json", "yml", "yaml", "toml", "xml", "ini", "cfg", "conf", "log", "csv", "sh", "py", "rs", "c",
    "cpp", "h", "hpp", "js", "ts", "go", "cmake", "sql",
];

pub struct TextPreview {
    max_bytes: usize,
    max_width: usize,
}

impl TextPreview {
    pub fn new(max_bytes: usize) -> Self {
        TextPreview { max_bytes, max_width: 200 }
    }

    pub fn can_preview(&self, node: &PathNode) -> bool {
        !node.is_directory()
            && node.extension().map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str())).unwrap_or(false)
    }

    /// The first `max_bytes` of the file as text, or `None` when it is not UTF-8.
    pub fn generate<F: FileSystem + ?Sized>(&self, fs: &F, node: &PathNode) -> FsResult<Option<String>> {
        let bytes = fs.read_prefix(node.path(), self.max_bytes)?;
        let Some(text) = decode_prefix(&bytes) else {
            return Ok(None);
        };
        let lines: Vec<String> = text.lines().map(|line| line.chars().take(self.max_width).collect()).collect();
        Ok(Some(lines.join("\n")))
    }
}

fn decode_prefix(bytes: &[u8]) -> Option<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        // the byte cap split a multi-byte character
        Err(err) if err.error_len().is_none() => {
            bytes.get(..err.valid_up_to()).and_then(|valid| std::str::from_utf8(valid).ok())
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFs;
    use std::path::Path;

    fn node(fs: &MemoryFs, path: &str) -> PathNode {
        fs.stat(Path::new(path)).unwrap()
    }

    #[test]
    fn test_only_text_extensions() {
        let fs = MemoryFs::new()
            .with_file("/root/notes.MD", b"")
            .with_file("/root/image.png", b"")
            .with_file("/root/Makefile", b"")
            .with_dir("/root/dir.txt");
        let preview = TextPreview::new(2000);
        assert!(preview.can_preview(&node(&fs, "/root/notes.MD")));
        assert!(!preview.can_preview(&node(&fs, "/root/image.png")));
        assert!(!preview.can_preview(&node(&fs, "/root/Makefile")));
        assert!(!preview.can_preview(&node(&fs, "/root/dir.txt")));
    }

    #[test]
    fn test_reads_at_most_max_bytes() {
        let fs = MemoryFs::new().with_file("/root/a.txt", b"line one\nline two\nline three");
        let text = TextPreview::new(12).generate(&fs, &node(&fs, "/root/a.txt")).unwrap();
        assert_eq!(text.as_deref(), Some("line one\nlin"));
    }

    #[test]
    fn test_cut_inside_multibyte_character() {
        let fs = MemoryFs::new().with_file("/root/a.txt", "añb".as_bytes());
        // 'ñ' is two bytes, the cap lands between them
        let text = TextPreview::new(2).generate(&fs, &node(&fs, "/root/a.txt")).unwrap();
        assert_eq!(text.as_deref(), Some("a"));
    }

    #[test]
    fn test_binary_content_is_not_text() {
        let fs = MemoryFs::new().with_file("/root/a.txt", &[0xff, 0xfe, 0x00, 0x41]);
        assert_eq!(TextPreview::new(2000).generate(&fs, &node(&fs, "/root/a.txt")).unwrap(), None);
    }
}
