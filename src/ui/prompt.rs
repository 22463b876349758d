// src/ui/prompt.rs
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Rename(PathBuf),
    NewFile,
    NewDirectory,
    ConfirmDelete(PathBuf),
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    Continue,
    Submit(String),
    Cancel,
}

/// One-line input box shown over the panes.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub title: String,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, title: impl Into<String>, initial: impl Into<String>) -> Self {
        Prompt { kind, title: title.into(), input: initial.into() }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        match key.code {
            // names keep their spaces; blank input submits nothing
            KeyCode::Enter if self.input.trim().is_empty() => PromptAction::Submit(String::new()),
            KeyCode::Enter => PromptAction::Submit(self.input.clone()),
            KeyCode::Esc => PromptAction::Cancel,
            KeyCode::Backspace => {
                self.input.pop();
                PromptAction::Continue
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                PromptAction::Continue
            }
            _ => PromptAction::Continue,
        }
    }
}
