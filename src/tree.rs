use indextree::{Arena, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::TreeError;

/// Whether a node is a regular file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn is_folder(self) -> bool {
        matches!(self, NodeKind::Folder)
    }

    /// Suffix used in status text.
    pub fn suffix(self) -> &'static str {
        match self {
            NodeKind::File => " (file)",
            NodeKind::Folder => " (folder)",
        }
    }
}

/// Represents a node in the directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    /// Bytes. For folders this is the sum over the children, clamped to
    /// `u64::MAX` if that sum does not fit.
    pub size: u64,
    /// The entry could not be read and was recorded as an empty file.
    pub unreadable: bool,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Mutable staging area for a [`FileTree`].
///
/// Entries must be added parent-first. Children are ordered by name and
/// folder sizes are summed bottom-up in [`TreeBuilder::build`], so the
/// finished tree never needs recomputation.
pub struct TreeBuilder {
    arena: Arena<TreeNode>,
    root: NodeId,
    path_to_node: HashMap<PathBuf, NodeId>,
}

impl TreeBuilder {
    /// Start a tree at `root_path`. `size` is only used when the root is a file.
    pub fn new<P: AsRef<Path>>(root_path: P, kind: NodeKind, size: u64) -> Self {
        let mut arena = Arena::new();
        let root_path_buf = root_path.as_ref().to_path_buf();

        let root_node = TreeNode {
            name: display_name(&root_path_buf),
            path: root_path_buf.clone(),
            kind,
            size: if kind.is_folder() { 0 } else { size },
            unreadable: false,
        };

        let root = arena.new_node(root_node);
        let mut path_to_node = HashMap::new();
        path_to_node.insert(root_path_buf, root);

        Self {
            arena,
            root,
            path_to_node,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.arena[self.root].get().path
    }

    /// Add a node below an already-added folder. `size` is ignored for folders.
    pub fn add_entry(
        &mut self,
        path: PathBuf,
        kind: NodeKind,
        size: u64,
    ) -> Result<NodeId, TreeError> {
        if self.path_to_node.contains_key(&path) {
            return Err(TreeError::DuplicatePath(path));
        }
        if !path.starts_with(self.root_path()) {
            return Err(TreeError::OutsideRoot(path));
        }

        let parent_id = match path.parent().and_then(|p| self.path_to_node.get(p)) {
            Some(&id) if self.arena[id].get().kind.is_folder() => id,
            _ => return Err(TreeError::OrphanEntry(path)),
        };

        let node = TreeNode {
            name: display_name(&path),
            path: path.clone(),
            kind,
            size: if kind.is_folder() { 0 } else { size },
            unreadable: false,
        };

        let node_id = self.arena.new_node(node);
        parent_id.append(node_id, &mut self.arena);
        self.path_to_node.insert(path, node_id);
        Ok(node_id)
    }

    /// Record an entry that could not be read as a file of size 0.
    ///
    /// An already-added folder loses whatever children it had collected.
    pub fn mark_unreadable(&mut self, path: &Path) -> Result<NodeId, TreeError> {
        let Some(&node_id) = self.path_to_node.get(path) else {
            let node_id = self.add_entry(path.to_path_buf(), NodeKind::File, 0)?;
            self.arena[node_id].get_mut().unreadable = true;
            return Ok(node_id);
        };

        let children: Vec<NodeId> = node_id.children(&self.arena).collect();
        for child in children {
            let stale: Vec<PathBuf> = child
                .descendants(&self.arena)
                .map(|id| self.arena[id].get().path.clone())
                .collect();
            for p in stale {
                self.path_to_node.remove(&p);
            }
            child.remove_subtree(&mut self.arena);
        }

        let node = self.arena[node_id].get_mut();
        node.kind = NodeKind::File;
        node.size = 0;
        node.unreadable = true;
        Ok(node_id)
    }

    /// Order children by name and compute folder sizes bottom-up.
    pub fn build(mut self) -> FileTree {
        self.sort_children();
        self.calculate_sizes();
        FileTree {
            arena: self.arena,
            root: self.root,
            path_to_node: self.path_to_node,
        }
    }

    fn sort_children(&mut self) {
        let folders: Vec<NodeId> = self.root.descendants(&self.arena).collect();
        for folder in folders {
            let mut children: Vec<NodeId> = folder.children(&self.arena).collect();
            if children.len() < 2 {
                continue;
            }
            let arena = &self.arena;
            if children
                .windows(2)
                .all(|w| arena[w[0]].get().name <= arena[w[1]].get().name)
            {
                continue;
            }
            children.sort_by(|a, b| arena[*a].get().name.cmp(&arena[*b].get().name));
            for &child in &children {
                child.detach(&mut self.arena);
            }
            for child in children {
                folder.append(child, &mut self.arena);
            }
        }
    }

    /// Post-order walk with an explicit stack; deep trees cannot overflow.
    fn calculate_sizes(&mut self) {
        let mut stack = vec![(self.root, false)];
        while let Some((node_id, children_done)) = stack.pop() {
            if !children_done {
                stack.push((node_id, true));
                stack.extend(node_id.children(&self.arena).map(|c| (c, false)));
                continue;
            }

            let mut overflowed = false;
            let total = node_id
                .children(&self.arena)
                .map(|c| self.arena[c].get().size)
                .fold(0u64, |acc, size| {
                    acc.checked_add(size).unwrap_or_else(|| {
                        overflowed = true;
                        u64::MAX
                    })
                });

            let node = self.arena[node_id].get_mut();
            if node.kind.is_folder() {
                if overflowed {
                    tracing::warn!(path = %node.path.display(), "folder size overflows u64, clamped");
                }
                node.size = total;
            }
        }
    }
}

/// Immutable hierarchical snapshot of a file-system subtree.
///
/// Nodes live in an arena; parent links are arena indices and never own
/// anything.
#[derive(Debug)]
pub struct FileTree {
    arena: Arena<TreeNode>,
    root: NodeId,
    path_to_node: HashMap<PathBuf, NodeId>,
}

impl FileTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        &self.node(self.root).path
    }

    /// Node data for an id obtained from this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        self.arena[id].get()
    }

    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.path_to_node.get(path).copied()
    }

    /// Children in name order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .map(|n| n.first_child().is_some())
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent())
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena).skip(1)
    }

    /// `id` and every folder below it, in pre-order.
    pub fn folder_descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
            .filter(move |d| self.node(*d).kind.is_folder())
    }

    pub fn len(&self) -> usize {
        self.path_to_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_to_node.is_empty()
    }

    /// Get total size of the tree
    pub fn total_size(&self) -> u64 {
        self.node(self.root).size
    }

    /// Names from the root down to `id`, joined by the platform separator and
    /// followed by the kind suffix, e.g. `root/docs/a.txt (file)`.
    pub fn path_string(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .map(|a| self.node(a).name.as_str())
            .collect();
        names.reverse();
        let node = self.node(id);
        names.push(node.name.as_str());

        let mut out = names.join(&MAIN_SEPARATOR.to_string());
        out.push_str(node.kind.suffix());
        out
    }
}
