use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Tracks which folders are expanded, keyed by full path.
///
/// The set does not know about the tree; callers decide which paths are
/// folders. Iteration order is path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<PathBuf>,
}

impl ExpansionState {
    /// Mark a folder expanded. Returns false if it already was.
    pub fn expand(&mut self, path: &Path) -> bool {
        self.expanded.insert(path.to_path_buf())
    }

    /// Check if a path is expanded.
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// Remove this path and all descendants from expanded set.
    pub fn collapse_recursive(&mut self, path: &Path) {
        self.expanded.retain(|p| !p.starts_with(path));
    }

    /// Reset all expansions.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> + '_ {
        self.expanded.iter().map(PathBuf::as_path)
    }
}
