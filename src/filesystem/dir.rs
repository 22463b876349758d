// src/filesystem/dir.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::sort::{sort_nodes, SortBy};
use super::{FileSystem, PathNode};
use crate::error::{FsError, FsResult};
use crate::history::HistoryManager;

/// Children of `path`, directories first, then by name ignoring case.
pub fn list_directory<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<Vec<PathNode>> {
    list_directory_by(fs, path, SortBy::Name)
}

pub fn list_directory_by<F: FileSystem + ?Sized>(fs: &F, path: &Path, sort_by: SortBy) -> FsResult<Vec<PathNode>> {
    let mut nodes = fs.read_dir(path)?;
    sort_nodes(&mut nodes, sort_by);
    tracing::debug!("listed {} ({} entries)", path.display(), nodes.len());
    Ok(nodes)
}

/// A directory together with its sorted children.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub node: PathNode,
    pub children: Vec<PathNode>,
}

pub fn read_directory_node<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> FsResult<DirectoryNode> {
    let node = fs.stat(path)?;
    let children = list_directory(fs, path)?;
    Ok(DirectoryNode { node, children })
}

/// Browsing state for one session: the current listing, its selection and the
/// back/forward history. Mutations happen elsewhere; call `refresh` after them.
pub struct Navigator {
    fs: Arc<dyn FileSystem>,
    history: HistoryManager,
    entries: Vec<PathNode>,
    listing_error: Option<FsError>,
    selected: usize,
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub filter: Option<String>,
    last_exited: Option<PathBuf>,
}

impl Navigator {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        let mut nav = Navigator {
            fs,
            history: HistoryManager::new(path),
            entries: Vec::new(),
            listing_error: None,
            selected: 0,
            show_hidden: false,
            sort_by: SortBy::Name,
            filter: None,
            last_exited: None,
        };
        nav.refresh();
        nav
    }

    pub fn current_path(&self) -> &Path {
        self.history.current()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn entries(&self) -> &[PathNode] {
        &self.entries
    }

    pub fn listing_error(&self) -> Option<&FsError> {
        self.listing_error.as_ref()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&PathNode> {
        self.entries.get(self.selected)
    }

    fn visible(&self, node: &PathNode) -> bool {
        if !self.show_hidden && node.is_hidden() {
            return false;
        }
        match &self.filter {
            Some(filter) => node.name().to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    fn load(&self, path: &Path) -> FsResult<Vec<PathNode>> {
        let mut nodes = list_directory_by(self.fs.as_ref(), path, self.sort_by)?;
        nodes.retain(|node| self.visible(node));
        Ok(nodes)
    }

    /// Re-list the current directory, keeping the selection on the same entry
    /// when it still exists.
    pub fn refresh(&mut self) {
        let keep = self
            .last_exited
            .take()
            .or_else(|| self.selected().map(|node| node.path().to_path_buf()));
        let path = self.current_path().to_path_buf();

        match self.load(&path) {
            Ok(nodes) => {
                self.entries = nodes;
                self.listing_error = None;
            }
            Err(err) => {
                tracing::warn!("cannot list {}: {}", path.display(), err);
                self.entries.clear();
                self.listing_error = Some(err);
            }
        }

        let index = keep.and_then(|keep| self.entries.iter().position(|node| node.path() == keep));
        self.selected = index.unwrap_or_else(|| self.selected.min(self.entries.len().saturating_sub(1)));
    }

    /// Listing of the parent directory, empty at the root or when unreadable.
    pub fn parent_entries(&self) -> Vec<PathNode> {
        match self.current_path().parent() {
            Some(parent) => self.load(parent).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn navigate_to(&mut self, path: &Path) -> FsResult<()> {
        let node = self.fs.stat(path)?;
        if !node.is_directory() {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        tracing::debug!("navigate to {}", path.display());
        self.history.push(path.to_path_buf());
        self.selected = 0;
        self.refresh();
        Ok(())
    }

    /// Enter the selected directory. Returns the selected file when it is not one.
    pub fn open_selected(&mut self) -> FsResult<Option<PathNode>> {
        let Some(node) = self.selected().cloned() else {
            return Ok(None);
        };
        if !node.is_directory() {
            return Ok(Some(node));
        }
        self.navigate_to(node.path())?;
        Ok(None)
    }

    pub fn navigate_up(&mut self) -> bool {
        let current = self.current_path().to_path_buf();
        let Some(parent) = current.parent() else {
            return false;
        };
        self.history.push(parent.to_path_buf());
        self.last_exited = Some(current);
        self.refresh();
        true
    }

    pub fn go_back(&mut self) -> bool {
        let exited = self.current_path().to_path_buf();
        if self.history.go_back().is_none() {
            return false;
        }
        self.last_exited = Some(exited);
        self.refresh();
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if self.history.go_forward().is_none() {
            return false;
        }
        self.selected = 0;
        self.refresh();
        true
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    /// Move the selection onto `path` if it is listed.
    pub fn select_path(&mut self, path: &Path) {
        if let Some(index) = self.entries.iter().position(|node| node.path() == path) {
            self.selected = index;
        }
    }

    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_by = self.sort_by.next();
        self.refresh();
    }

    pub fn search(&mut self, query: &str) {
        self.filter = if query.is_empty() { None } else { Some(query.to_string()) };
        self.selected = 0;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFs;

    fn sample() -> MemoryFs {
        MemoryFs::new()
            .with_file("/root/banana", b"")
            .with_file("/root/Apple", b"")
            .with_file("/root/.hidden", b"")
            .with_file("/root/sub/leaf/deep.txt", b"")
            .with_dir("/root/Docs")
    }

    fn names(nodes: &[PathNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_list_directory_sorted() {
        let fs = sample();
        let nodes = list_directory(&fs, Path::new("/root")).unwrap();
        assert_eq!(names(&nodes), vec!["Docs", "sub", ".hidden", "Apple", "banana"]);
        let again = list_directory(&fs, Path::new("/root")).unwrap();
        assert_eq!(nodes, again);
    }

    #[test]
    fn test_list_directory_errors_are_distinct_from_empty() {
        let fs = sample().with_dir("/root/empty");
        fs.deny("/root/sub");
        assert!(list_directory(&fs, Path::new("/root/empty")).unwrap().is_empty());
        assert!(matches!(list_directory(&fs, Path::new("/root/sub")), Err(FsError::AccessDenied(_))));
        assert!(matches!(list_directory(&fs, Path::new("/nope")), Err(FsError::NotFound(_))));
        assert!(matches!(list_directory(&fs, Path::new("/root/Apple")), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_read_directory_node() {
        let fs = sample();
        let dir = read_directory_node(&fs, Path::new("/root/sub")).unwrap();
        assert_eq!(dir.node.name(), "sub");
        assert!(dir.node.is_directory());
        assert_eq!(names(&dir.children), vec!["leaf"]);
    }

    #[test]
    fn test_navigator_hides_dotfiles_by_default() {
        let mut nav = Navigator::new(Arc::new(sample()), PathBuf::from("/root"));
        assert_eq!(names(nav.entries()), vec!["Docs", "sub", "Apple", "banana"]);
        nav.toggle_hidden();
        assert!(names(nav.entries()).contains(&".hidden"));
    }

    #[test]
    fn test_navigator_enter_back_forward() {
        let mut nav = Navigator::new(Arc::new(sample()), PathBuf::from("/root"));
        nav.select_path(Path::new("/root/sub"));
        assert_eq!(nav.open_selected().unwrap(), None);
        assert_eq!(nav.current_path(), Path::new("/root/sub"));

        assert!(nav.go_back());
        assert_eq!(nav.current_path(), Path::new("/root"));
        // the directory just left stays highlighted
        assert_eq!(nav.selected().unwrap().name(), "sub");

        assert!(nav.go_forward());
        assert_eq!(nav.current_path(), Path::new("/root/sub"));
        assert!(!nav.go_forward());
    }

    #[test]
    fn test_navigator_open_file_returns_node() {
        let mut nav = Navigator::new(Arc::new(sample()), PathBuf::from("/root"));
        nav.select_path(Path::new("/root/Apple"));
        let opened = nav.open_selected().unwrap().unwrap();
        assert_eq!(opened.name(), "Apple");
        assert_eq!(nav.current_path(), Path::new("/root"));
    }

    #[test]
    fn test_navigator_up_highlights_child() {
        let mut nav = Navigator::new(Arc::new(sample()), PathBuf::from("/root/sub/leaf"));
        assert!(nav.navigate_up());
        assert_eq!(nav.current_path(), Path::new("/root/sub"));
        assert_eq!(nav.selected().unwrap().name(), "leaf");
        assert_eq!(nav.history().back_stack(), &[PathBuf::from("/root/sub/leaf")]);
    }

    #[test]
    fn test_navigator_denied_directory_reports_error() {
        let fs = sample();
        fs.deny("/root/sub");
        let mut nav = Navigator::new(Arc::new(fs), PathBuf::from("/root"));
        nav.navigate_to(Path::new("/root/sub")).unwrap();
        assert!(nav.entries().is_empty());
        assert!(matches!(nav.listing_error(), Some(FsError::AccessDenied(_))));
    }

    #[test]
    fn test_navigator_refresh_after_mutation() {
        let fs = sample();
        let mut nav = Navigator::new(Arc::new(fs.clone()), PathBuf::from("/root"));
        fs.create_file(Path::new("/root/cherry")).unwrap();
        assert!(!names(nav.entries()).contains(&"cherry"));
        nav.refresh();
        assert!(names(nav.entries()).contains(&"cherry"));
    }

    #[test]
    fn test_navigator_search_and_parent() {
        let mut nav = Navigator::new(Arc::new(sample()), PathBuf::from("/root/sub"));
        assert_eq!(names(&nav.parent_entries()), vec!["Docs", "sub", "Apple", "banana"]);
        nav.navigate_up();
        nav.search("AN");
        assert_eq!(names(nav.entries()), vec!["banana"]);
        nav.search("");
        assert_eq!(nav.entries().len(), 4);
    }
}
