// src/ui/mod.rs
pub mod prompt;
pub mod render;

pub use prompt::{Prompt, PromptAction, PromptKind};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Handle;

use crate::config::Config;
use crate::error::FsError;
use crate::filesystem::{list_directory, FileSystem, Navigator, PathNode};
use crate::ops::{Completion, CopyOptions, Operation, OperationWorker};
use crate::preview::TextPreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Empty,
    Directory { children: Vec<PathNode>, total: usize },
    Unavailable(String),
    File(PathNode),
    Text { node: PathNode, text: String },
}

pub struct App {
    pub navigator: Navigator,
    worker: OperationWorker,
    fs: Arc<dyn FileSystem>,
    config: Config,
    pub parent: Vec<PathNode>,
    pub preview: Preview,
    pub clipboard: Option<PathBuf>,
    pub prompt: Option<Prompt>,
    pub message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(fs: Arc<dyn FileSystem>, runtime: Handle, config: Config, start: PathBuf) -> Self {
        let mut navigator = Navigator::new(Arc::clone(&fs), start);
        navigator.show_hidden = config.show_hidden;
        navigator.sort_by = config.sort_by;
        navigator.refresh();
        let worker = OperationWorker::new(Arc::clone(&fs), runtime);
        let mut app = App {
            navigator,
            worker,
            fs,
            config,
            parent: Vec::new(),
            preview: Preview::Empty,
            clipboard: None,
            prompt: None,
            message: None,
            should_quit: false,
        };
        app.sync();
        app
    }

    pub fn jobs_in_flight(&self) -> usize {
        self.worker.in_flight()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage { text: text.into(), severity: Severity::Info });
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage { text: text.into(), severity: Severity::Warning });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage { text: text.into(), severity: Severity::Error });
    }

    /// Recompute the parent pane and the preview after any state change.
    fn sync(&mut self) {
        self.parent = self.navigator.parent_entries();
        self.preview = match self.navigator.selected() {
            None => Preview::Empty,
            Some(node) if self.worker.is_busy(node.path()) => Preview::Unavailable("Busy".to_string()),
            Some(node) if node.is_directory() => match list_directory(self.fs.as_ref(), node.path()) {
                Ok(children) => {
                    let total = children.len();
                    let children = children.into_iter().take(self.config.preview_entries).collect();
                    Preview::Directory { children, total }
                }
                Err(err) => Preview::Unavailable(err.label().to_string()),
            },
            Some(node) => self.file_preview(node),
        };
    }

    fn file_preview(&self, node: &PathNode) -> Preview {
        let text = TextPreview::new(self.config.preview_bytes);
        if !text.can_preview(node) {
            return Preview::File(node.clone());
        }
        match text.generate(self.fs.as_ref(), node) {
            Ok(Some(text)) => Preview::Text { node: node.clone(), text },
            Ok(None) => Preview::File(node.clone()),
            Err(err) => Preview::Unavailable(err.label().to_string()),
        }
    }

    fn busy_guard(&mut self, path: &Path) -> bool {
        if self.worker.is_busy(path) {
            self.warn(format!("{} is being modified", path.display()));
            return true;
        }
        false
    }

    /// Pick up finished background operations and re-list. Returns how many
    /// operations completed.
    pub fn tick(&mut self) -> usize {
        let done = self.worker.poll();
        let count = done.len();
        if count == 0 {
            return 0;
        }
        for completion in done {
            self.report(completion);
        }
        if !self.worker.is_busy(self.navigator.current_path()) {
            self.navigator.refresh();
        }
        self.sync();
        count
    }

    fn report(&mut self, completion: Completion) {
        let Completion { operation, result, .. } = completion;
        match result {
            Ok(_) => {
                self.info(operation.describe());
                if let Operation::Rename { to, .. } | Operation::Touch { path: to } | Operation::MakeDir { path: to } =
                    &operation
                {
                    self.navigator.refresh();
                    self.navigator.select_path(to);
                }
            }
            Err(err) => self.error(format!("Failed: {}", err)),
        }
    }

    fn submit(&mut self, operation: Operation) {
        match self.worker.submit(operation) {
            Ok(_) => {}
            Err(err) => self.warn(err.to_string()),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(mut prompt) = self.prompt.take() {
            match prompt.handle_key(key) {
                PromptAction::Continue => self.prompt = Some(prompt),
                PromptAction::Cancel => {}
                PromptAction::Submit(value) => self.finish_prompt(prompt.kind, value),
            }
            self.sync();
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.navigator.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.navigator.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.navigator.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.navigator.select_last(),
            KeyCode::Char('l') | KeyCode::Enter | KeyCode::Right => self.enter_selected(),
            KeyCode::Char('h') | KeyCode::Left => self.go_back(),
            KeyCode::Char('L') => self.go_forward(),
            KeyCode::Char('u') | KeyCode::Backspace => self.go_up(),
            KeyCode::Char('.') => self.navigator.toggle_hidden(),
            KeyCode::Char('s') => {
                self.navigator.cycle_sort();
                self.info(format!("Sort: {}", self.navigator.sort_by.label()));
            }
            KeyCode::Char('/') => {
                let current = self.navigator.filter.clone().unwrap_or_default();
                self.prompt = Some(Prompt::new(PromptKind::Search, "Filter:", current));
            }
            KeyCode::Esc => self.navigator.search(""),
            KeyCode::Char('c') => self.copy_selected(),
            KeyCode::Char('p') => self.paste(),
            KeyCode::Char('d') => {
                if let Some(node) = self.navigator.selected() {
                    let title = format!("Delete '{}'? (y/n)", node.name());
                    self.prompt = Some(Prompt::new(PromptKind::ConfirmDelete(node.path().to_path_buf()), title, ""));
                }
            }
            KeyCode::Char('r') => {
                if let Some(node) = self.navigator.selected() {
                    let title = format!("Rename '{}' to:", node.name());
                    let initial = node.name().to_string();
                    self.prompt = Some(Prompt::new(PromptKind::Rename(node.path().to_path_buf()), title, initial));
                }
            }
            KeyCode::Char('n') => self.prompt = Some(Prompt::new(PromptKind::NewFile, "New File Name:", "")),
            KeyCode::Char('N') => self.prompt = Some(Prompt::new(PromptKind::NewDirectory, "New Folder Name:", "")),
            _ => {}
        }
        self.sync();
    }

    fn enter_selected(&mut self) {
        let Some(node) = self.navigator.selected().cloned() else {
            return;
        };
        if node.is_directory() && self.busy_guard(node.path()) {
            return;
        }
        match self.navigator.open_selected() {
            Ok(Some(file)) => self.info(format!("Selected file: {}", file.name())),
            Ok(None) => {}
            Err(err) => self.error(err.to_string()),
        }
    }

    fn go_back(&mut self) {
        if let Some(target) = self.navigator.history().back_stack().last().cloned() {
            if self.busy_guard(&target) {
                return;
            }
        }
        if !self.navigator.go_back() {
            self.info("No previous directory");
        }
    }

    fn go_forward(&mut self) {
        if let Some(target) = self.navigator.history().forward_stack().last().cloned() {
            if self.busy_guard(&target) {
                return;
            }
        }
        if !self.navigator.go_forward() {
            self.info("No next directory");
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.navigator.current_path().parent().map(Path::to_path_buf) {
            if self.busy_guard(&parent) {
                return;
            }
        }
        self.navigator.navigate_up();
    }

    fn copy_selected(&mut self) {
        if let Some(node) = self.navigator.selected() {
            let text = format!("Copied to clipboard: {}", node.name());
            self.clipboard = Some(node.path().to_path_buf());
            self.info(text);
        }
    }

    fn paste(&mut self) {
        let Some(src) = self.clipboard.clone() else {
            self.warn("Clipboard is empty");
            return;
        };
        let Some(name) = src.file_name() else {
            self.error(format!("Cannot paste {}", src.display()));
            return;
        };
        let dest = self.navigator.current_path().join(name);
        let options = CopyOptions { merge: self.config.merge_on_paste };
        self.submit(Operation::Copy { src, dest, options });
    }

    fn finish_prompt(&mut self, kind: PromptKind, value: String) {
        match kind {
            PromptKind::Search => self.navigator.search(&value),
            PromptKind::ConfirmDelete(path) => {
                if value.trim().eq_ignore_ascii_case("y") {
                    self.submit(Operation::Remove { path });
                }
            }
            PromptKind::Rename(from) => {
                let unchanged = from.file_name().map(|n| n.to_string_lossy() == value.as_str()).unwrap_or(false);
                if value.is_empty() || unchanged {
                    return;
                }
                if self.child_path(&value).is_some() {
                    let to = from.with_file_name(&value);
                    self.submit(Operation::Rename { from, to });
                }
            }
            PromptKind::NewFile => {
                if let Some(path) = self.child_path(&value) {
                    self.submit(Operation::Touch { path });
                }
            }
            PromptKind::NewDirectory => {
                if value.is_empty() {
                    return;
                }
                // nested names like "a/b" are allowed here
                let path = self.navigator.current_path().join(&value);
                self.submit(Operation::MakeDir { path });
            }
        }
    }

    /// A single path component under the current directory.
    fn child_path(&mut self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(part)), None) => Some(self.navigator.current_path().join(part)),
            _ => {
                if !name.is_empty() {
                    let err = FsError::InvalidTarget { path: PathBuf::from(name), reason: "not a plain name" };
                    self.error(err.to_string());
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFs;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(c));
        }
    }

    /// Wait until submitted jobs have finished and been picked up.
    async fn settle(app: &mut App) {
        for _ in 0..200 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            if app.tick() > 0 && app.jobs_in_flight() == 0 {
                return;
            }
        }
    }

    fn app_with(fs: MemoryFs) -> App {
        App::new(Arc::new(fs), Handle::current(), Config::default(), PathBuf::from("/root"))
    }

    #[tokio::test]
    async fn test_new_file_prompt_creates_and_selects() {
        let fs = MemoryFs::new().with_dir("/root");
        let mut app = app_with(fs.clone());
        app.handle_key(key('n'));
        type_text(&mut app, "notes.txt");
        app.handle_key(enter());
        settle(&mut app).await;

        assert!(fs.read("/root/notes.txt").is_some());
        assert_eq!(app.navigator.selected().unwrap().name(), "notes.txt");
        assert_eq!(app.message.as_ref().unwrap().text, "Created file: notes.txt");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let fs = MemoryFs::new().with_file("/root/sub/a", b"");
        let mut app = app_with(fs.clone());
        app.handle_key(key('d'));
        type_text(&mut app, "n");
        app.handle_key(enter());
        settle(&mut app).await;
        assert!(fs.is_dir("/root/sub"));

        app.handle_key(key('d'));
        type_text(&mut app, "y");
        app.handle_key(enter());
        settle(&mut app).await;
        assert!(!fs.is_dir("/root/sub"));
        assert!(app.navigator.entries().is_empty());
    }

    #[tokio::test]
    async fn test_copy_paste_collision_reports_error() {
        let fs = MemoryFs::new().with_file("/root/a.txt", b"x");
        let mut app = app_with(fs);
        app.handle_key(key('c'));
        app.handle_key(key('p'));
        settle(&mut app).await;
        let message = app.message.clone().unwrap();
        assert_eq!(message.severity, Severity::Error);
        assert!(message.text.contains("Already exists"));
    }

    #[tokio::test]
    async fn test_paste_into_other_directory() {
        let fs = MemoryFs::new().with_dir("/root/dst").with_file("/root/z.txt", b"x");
        let mut app = app_with(fs.clone());
        app.navigator.select_path(Path::new("/root/z.txt"));
        app.handle_key(key('c'));
        app.navigator.select_path(Path::new("/root/dst"));
        app.handle_key(enter());
        assert_eq!(app.navigator.current_path(), Path::new("/root/dst"));
        app.handle_key(key('p'));
        settle(&mut app).await;
        assert_eq!(fs.read("/root/dst/z.txt"), Some(b"x".to_vec()));
        assert_eq!(app.navigator.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_rejects_path_separators() {
        let fs = MemoryFs::new().with_file("/root/a", b"");
        let mut app = app_with(fs.clone());
        app.handle_key(key('r'));
        app.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        type_text(&mut app, "../b");
        app.handle_key(enter());
        settle(&mut app).await;
        assert!(fs.read("/root/a").is_some());
        assert_eq!(app.message.as_ref().unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_text_file_preview() {
        let fs = MemoryFs::new()
            .with_file("/root/data.bin", b"\x00\x01")
            .with_file("/root/readme.md", b"# Title\nbody");
        let mut app = app_with(fs);
        assert!(matches!(&app.preview, Preview::File(node) if node.name() == "data.bin"));

        app.handle_key(key('j'));
        match &app.preview {
            Preview::Text { node, text } => {
                assert_eq!(node.name(), "readme.md");
                assert_eq!(text, "# Title\nbody");
            }
            other => panic!("unexpected preview {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_directory_preview_and_parent() {
        let fs = MemoryFs::new().with_file("/root/sub/one", b"").with_file("/root/sub/two", b"");
        let app = app_with(fs);
        match &app.preview {
            Preview::Directory { children, total } => {
                assert_eq!(*total, 2);
                assert_eq!(children[0].name(), "one");
            }
            other => panic!("unexpected preview {other:?}"),
        }
        assert_eq!(app.parent.len(), 1);
        assert_eq!(app.parent[0].name(), "root");
    }
}
