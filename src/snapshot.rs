//! Already-materialized file-system records, as handed over by a reader that
//! is not the built-in [`crawler`](crate::crawler).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TreeError;
use crate::tree::{FileTree, NodeKind, TreeBuilder};

/// One nested record of a file-system snapshot.
///
/// `size` is read for files only; folder sizes are always recomputed from
/// their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub kind: NodeKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotEntry>,
}

impl SnapshotEntry {
    pub fn file<P: Into<PathBuf>>(path: P, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            size,
            children: Vec::new(),
        }
    }

    pub fn folder<P: Into<PathBuf>>(path: P, children: Vec<SnapshotEntry>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Folder,
            size: 0,
            children,
        }
    }
}

impl FileTree {
    /// Build a tree from a nested snapshot.
    ///
    /// Fails when paths repeat, escape the root, or hang below a file.
    pub fn from_snapshot(root: &SnapshotEntry) -> Result<Self, TreeError> {
        let mut builder = TreeBuilder::new(&root.path, root.kind, root.size);

        // parents are always popped before their children
        let mut pending: Vec<&SnapshotEntry> = root.children.iter().rev().collect();
        while let Some(entry) = pending.pop() {
            builder.add_entry(entry.path.clone(), entry.kind, entry.size)?;
            pending.extend(entry.children.iter().rev());
        }

        let tree = builder.build();
        tracing::debug!(
            root = %tree.root_path().display(),
            nodes = tree.len(),
            total = tree.total_size(),
            "tree built from snapshot"
        );
        Ok(tree)
    }
}
