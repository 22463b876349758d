// src/history/mod.rs
use std::path::{Path, PathBuf};

/// Back/forward stack of visited directories.
///
/// `current` lives outside both stacks. A new `push` drops any forward
/// history, the same way a browser does after following a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryManager {
    back_stack: Vec<PathBuf>,
    forward_stack: Vec<PathBuf>,
    current: PathBuf,
}

impl HistoryManager {
    pub fn new(path: PathBuf) -> Self {
        HistoryManager { back_stack: Vec::new(), forward_stack: Vec::new(), current: path }
    }

    pub fn init(&mut self, path: PathBuf) {
        self.back_stack.clear();
        self.forward_stack.clear();
        self.current = path;
    }

    pub fn push(&mut self, path: PathBuf) {
        if path == self.current {
            return;
        }
        let previous = std::mem::replace(&mut self.current, path);
        self.back_stack.push(previous);
        self.forward_stack.clear();
    }

    pub fn go_back(&mut self) -> Option<PathBuf> {
        let prev = self.back_stack.pop()?;
        let exited = std::mem::replace(&mut self.current, prev.clone());
        self.forward_stack.push(exited);
        Some(prev)
    }

    pub fn go_forward(&mut self) -> Option<PathBuf> {
        let next = self.forward_stack.pop()?;
        let exited = std::mem::replace(&mut self.current, next.clone());
        self.back_stack.push(exited);
        Some(next)
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Oldest first.
    pub fn back_stack(&self) -> &[PathBuf] {
        &self.back_stack
    }

    /// The next `go_forward` target is the last element.
    pub fn forward_stack(&self) -> &[PathBuf] {
        &self.forward_stack
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }
}
