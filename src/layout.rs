use indextree::NodeId;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::RootPolicy;
use crate::expand_state::ExpansionState;
use crate::tree::{FileTree, NodeKind};
use crate::treemap::{Rect, SliceTreemap};

/// One node on the visible frontier together with its rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaidOutRect {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    pub rect: Rect,
    /// 0 for the layout root.
    pub depth: usize,
    /// Arena id of the node in the tree the layout was computed from.
    #[serde(skip)]
    pub node: NodeId,
    /// Indices of laid-out children; empty unless the node was expanded.
    #[serde(skip)]
    pub children: Vec<usize>,
}

/// Rectangles for every node on the visible frontier, in pre-order.
///
/// A layout is a value: it is rebuilt from scratch on every pass and never
/// patched after expand/collapse.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rects: Vec<LaidOutRect>,
    by_path: HashMap<PathBuf, usize>,
}

impl Layout {
    /// All laid-out nodes, parents before their children.
    pub fn rects(&self) -> &[LaidOutRect] {
        &self.rects
    }

    /// The layout root, absent when the target rectangle was degenerate.
    pub fn root(&self) -> Option<&LaidOutRect> {
        self.rects.first()
    }

    pub fn get(&self, path: &Path) -> Option<&LaidOutRect> {
        self.by_path.get(path).map(|&i| &self.rects[i])
    }

    /// Laid-out children of `entry`, looked up by path in this layout. An
    /// entry this layout does not hold has no children here.
    pub fn children_of<'a>(
        &'a self,
        entry: &'a LaidOutRect,
    ) -> impl Iterator<Item = &'a LaidOutRect> + 'a {
        self.get(&entry.path)
            .filter(|own| own.node == entry.node)
            .into_iter()
            .flat_map(move |own| own.children.iter().map(move |&i| &self.rects[i]))
    }

    /// Entries at depth 1: the layout root's immediate children.
    pub fn top_level(&self) -> impl Iterator<Item = &LaidOutRect> + '_ {
        self.root()
            .into_iter()
            .flat_map(move |root| self.children_of(root))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Lay out `node` and its visible descendants inside `area`.
///
/// A folder is subdivided when it is expanded (the layout root also counts as
/// expanded under [`RootPolicy::AlwaysExpanded`]), has children, and received
/// a non-degenerate rectangle. The result depends only on the arguments.
/// A degenerate `area` gives an empty layout.
pub fn compute_layout(
    tree: &FileTree,
    node: NodeId,
    area: Rect,
    expansion: &ExpansionState,
    root_policy: RootPolicy,
) -> Layout {
    let mut layout = Layout::default();

    if area.is_degenerate() {
        tracing::debug!(?area, "degenerate layout target, nothing laid out");
        return layout;
    }

    // (node, rect, depth, parent index); popped in pre-order
    let mut pending = vec![(node, area, 0usize, None::<usize>)];

    while let Some((node_id, rect, depth, parent)) = pending.pop() {
        let data = tree.node(node_id);
        let index = layout.rects.len();

        layout.rects.push(LaidOutRect {
            path: data.path.clone(),
            name: data.name.clone(),
            kind: data.kind,
            size: data.size,
            rect,
            depth,
            node: node_id,
            children: Vec::new(),
        });
        layout.by_path.insert(data.path.clone(), index);
        if let Some(parent) = parent {
            layout.rects[parent].children.push(index);
        }

        let expanded = data.kind.is_folder()
            && (expansion.is_expanded(&data.path)
                || (depth == 0 && root_policy == RootPolicy::AlwaysExpanded));
        if !expanded || rect.is_degenerate() {
            continue;
        }

        let children: Vec<NodeId> = tree.children(node_id).collect();
        let sizes: Vec<u64> = children.iter().map(|&c| tree.node(c).size).collect();
        let slices = SliceTreemap::partition(&sizes, rect);

        for (&child, slice) in children.iter().zip(slices).rev() {
            pending.push((child, slice, depth + 1, Some(index)));
        }
    }

    tracing::debug!(
        root = %tree.node(node).path.display(),
        ?area,
        visible = layout.len(),
        "layout pass"
    );
    layout
}
