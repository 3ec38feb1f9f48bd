use indextree::NodeId;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{FrontierConfig, RootPolicy};
use crate::error::FrontierError;
use crate::expand_state::ExpansionState;
use crate::layout::{compute_layout, Layout};
use crate::selection;
use crate::tree::{FileTree, NodeKind};
use crate::treemap::{Point, Rect};

/// Metadata of the selected node, for a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionInfo {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    /// e.g. `root/docs/a.txt (file)  (1024)`
    pub label: String,
}

struct CachedLayout {
    area: Rect,
    layout: Layout,
}

/// Owns the static tree plus the only mutable state: which folders are
/// expanded and which node is selected.
///
/// Every state change (expansion or selection) drops the cached layout;
/// point lookups then fail with [`FrontierError::StaleLayout`] until
/// [`layout`](Self::layout) runs again.
pub struct FrontierController {
    tree: FileTree,
    config: FrontierConfig,
    expansion: ExpansionState,
    selection: Option<NodeId>,
    cached: Option<CachedLayout>,
}

impl FrontierController {
    pub fn new(tree: FileTree, config: FrontierConfig) -> Self {
        Self {
            tree,
            config,
            expansion: ExpansionState::default(),
            selection: None,
            cached: None,
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn config(&self) -> &FrontierConfig {
        &self.config
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selection.map(|id| self.tree.node(id).path.as_path())
    }

    pub fn selection_info(&self) -> Option<SelectionInfo> {
        let id = self.selection?;
        let node = self.tree.node(id);
        Some(SelectionInfo {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind,
            size: node.size,
            label: format!("{}  ({})", self.tree.path_string(id), node.size),
        })
    }

    fn lookup(&self, path: &Path) -> Result<NodeId, FrontierError> {
        self.tree
            .find(path)
            .ok_or_else(|| FrontierError::NotFound(path.to_path_buf()))
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Open `id` and every ancestor. Returns whether the set changed.
    fn open_with_ancestors(&mut self, id: NodeId) -> bool {
        let mut changed = false;
        for a in self.tree.ancestors(id) {
            changed |= self.expansion.expand(&self.tree.node(a).path);
        }
        changed | self.expansion.expand(&self.tree.node(id).path)
    }

    /// Expand a folder, and its ancestors so it is on the frontier. Files and
    /// already-expanded folders are left alone.
    pub fn expand(&mut self, path: &Path) -> Result<(), FrontierError> {
        let id = self.lookup(path)?;
        if !self.tree.node(id).kind.is_folder() {
            return Ok(());
        }
        if self.open_with_ancestors(id) {
            tracing::debug!(path = %path.display(), "expanded");
            self.invalidate();
        }
        Ok(())
    }

    /// Expand a folder together with every folder below it.
    pub fn expand_all(&mut self, path: &Path) -> Result<(), FrontierError> {
        let id = self.lookup(path)?;
        if !self.tree.node(id).kind.is_folder() {
            return Ok(());
        }

        let mut changed = self.open_with_ancestors(id);
        let folders: Vec<NodeId> = self.tree.folder_descendants(id).collect();
        for folder in folders {
            changed |= self.expansion.expand(&self.tree.node(folder).path);
        }

        if changed {
            tracing::debug!(path = %path.display(), expanded = self.expansion.len(), "expanded subtree");
            self.invalidate();
        }
        Ok(())
    }

    /// Collapse the folder that contains `path`, plus every expanded folder
    /// below it. A parentless target collapses itself.
    pub fn collapse(&mut self, path: &Path) -> Result<(), FrontierError> {
        let id = self.lookup(path)?;
        let target = self.tree.parent(id).unwrap_or(id);
        let before = self.expansion.len();

        self.expansion
            .collapse_recursive(&self.tree.node(target).path);

        if self.expansion.len() != before {
            tracing::debug!(path = %self.tree.node(target).path.display(), "collapsed");
            self.invalidate();
            self.retarget_selection();
        }
        Ok(())
    }

    /// Empty the expansion set. What remains visible depends on
    /// [`RootPolicy`]: the root's children, or the root alone.
    pub fn collapse_all(&mut self) {
        if self.expansion.is_empty() {
            return;
        }
        self.expansion.collapse_all();
        tracing::debug!("collapsed all");
        self.invalidate();
        self.retarget_selection();
    }

    /// Select the node at `path`. Unknown paths leave the selection untouched.
    pub fn select(&mut self, path: &Path) -> Result<(), FrontierError> {
        let id = self.lookup(path)?;
        self.set_selection(Some(id));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    fn set_selection(&mut self, selection: Option<NodeId>) {
        self.selection = selection;
        self.invalidate();
    }

    /// Move the selection one level up. Returns false at the root or
    /// without a selection.
    pub fn select_parent(&mut self) -> bool {
        match self.selection.and_then(|id| self.tree.parent(id)) {
            Some(parent) => {
                self.set_selection(Some(parent));
                true
            }
            None => false,
        }
    }

    pub fn expand_selected(&mut self) -> Result<(), FrontierError> {
        match self.selected_path().map(Path::to_path_buf) {
            Some(path) => self.expand(&path),
            None => Ok(()),
        }
    }

    pub fn expand_all_selected(&mut self) -> Result<(), FrontierError> {
        match self.selected_path().map(Path::to_path_buf) {
            Some(path) => self.expand_all(&path),
            None => Ok(()),
        }
    }

    pub fn collapse_selected(&mut self) -> Result<(), FrontierError> {
        match self.selected_path().map(Path::to_path_buf) {
            Some(path) => self.collapse(&path),
            None => Ok(()),
        }
    }

    /// Layout of the whole tree inside `area`, recomputed only when the
    /// controller state or the area changed since the last call.
    pub fn layout(&mut self, area: Rect) -> &Layout {
        if self.cached.as_ref().is_some_and(|c| c.area != area) {
            self.cached = None;
        }

        let tree = &self.tree;
        let expansion = &self.expansion;
        let policy = self.config.root_policy;
        &self
            .cached
            .get_or_insert_with(|| CachedLayout {
                area,
                layout: compute_layout(tree, tree.root(), area, expansion, policy),
            })
            .layout
    }

    /// The last computed layout, if no mutation has invalidated it.
    pub fn current_layout(&self) -> Option<&Layout> {
        self.cached.as_ref().map(|c| &c.layout)
    }

    fn resolve_point(&self, point: Point) -> Result<Option<NodeId>, FrontierError> {
        let layout = self.current_layout().ok_or(FrontierError::StaleLayout)?;
        Ok(selection::resolve(layout, point).map(|entry| entry.node))
    }

    /// Select the deepest visible node under `point`. A point outside the
    /// layout leaves the selection unchanged and returns `None`.
    pub fn select_at(&mut self, point: Point) -> Result<Option<NodeId>, FrontierError> {
        let hit = self.resolve_point(point)?;
        if hit.is_some() {
            self.set_selection(hit);
        }
        Ok(hit)
    }

    /// Click behaviour: hitting the selected node again clears the selection,
    /// missing everything keeps it. Returns the selection afterwards.
    pub fn toggle_at(&mut self, point: Point) -> Result<Option<NodeId>, FrontierError> {
        match self.resolve_point(point)? {
            Some(hit) if self.selection == Some(hit) => self.set_selection(None),
            Some(hit) => self.set_selection(Some(hit)),
            None => {}
        }
        Ok(self.selection)
    }

    fn is_open(&self, id: NodeId) -> bool {
        let node = self.tree.node(id);
        self.expansion.is_expanded(&node.path)
            || (id == self.tree.root() && self.config.root_policy == RootPolicy::AlwaysExpanded)
    }

    /// After a collapse the selected node may be hidden; select the
    /// frontier node that now covers it.
    fn retarget_selection(&mut self) {
        let Some(selected) = self.selection else {
            return;
        };
        let mut chain: Vec<NodeId> = self.tree.ancestors(selected).collect();
        chain.reverse();
        if let Some(&closed) = chain.iter().find(|&&a| !self.is_open(a)) {
            self.set_selection(Some(closed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotEntry;

    /// root(100){ A(file,40), B{ D{ C(file,60) } } }
    fn controller(policy: RootPolicy) -> FrontierController {
        let tree = FileTree::from_snapshot(&SnapshotEntry::folder(
            "/root",
            vec![
                SnapshotEntry::file("/root/A", 40),
                SnapshotEntry::folder(
                    "/root/B",
                    vec![SnapshotEntry::folder(
                        "/root/B/D",
                        vec![SnapshotEntry::file("/root/B/D/C", 60)],
                    )],
                ),
            ],
        ))
        .unwrap();
        FrontierController::new(tree, FrontierConfig { root_policy: policy })
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 10,
    };

    fn visible(ctl: &mut FrontierController) -> Vec<String> {
        ctl.layout(AREA)
            .rects()
            .iter()
            .map(|e| e.path.display().to_string())
            .collect()
    }

    #[test]
    fn test_expand_shows_children() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        assert_eq!(visible(&mut ctl), vec!["/root", "/root/A", "/root/B"]);

        ctl.expand(Path::new("/root/B")).unwrap();
        assert_eq!(
            visible(&mut ctl),
            vec!["/root", "/root/A", "/root/B", "/root/B/D"]
        );
    }

    #[test]
    fn test_expand_opens_ancestors() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand(Path::new("/root/B/D")).unwrap();
        assert!(ctl.expansion().is_expanded(Path::new("/root/B")));
        assert!(visible(&mut ctl).contains(&"/root/B/D/C".to_string()));
    }

    #[test]
    fn test_expand_file_is_noop() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.layout(AREA);
        ctl.expand(Path::new("/root/A")).unwrap();
        assert!(ctl.expansion().is_empty());
        // nothing changed, so the layout is still usable
        assert!(ctl.current_layout().is_some());
    }

    #[test]
    fn test_expand_unknown_path() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        assert_eq!(
            ctl.expand(Path::new("/root/nope")),
            Err(FrontierError::NotFound(PathBuf::from("/root/nope")))
        );
    }

    #[test]
    fn test_expand_all_opens_every_folder() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand_all(Path::new("/root/B")).unwrap();
        let expanded: Vec<&Path> = ctl.expansion().iter().collect();
        assert_eq!(
            expanded,
            vec![Path::new("/root"), Path::new("/root/B"), Path::new("/root/B/D")]
        );

        ctl.expand_all(Path::new("/root/A")).unwrap();
        assert_eq!(ctl.expansion().len(), 3);
    }

    #[test]
    fn test_collapse_all_resets_to_root_children() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand_all(Path::new("/root")).unwrap();
        ctl.collapse_all();
        assert!(ctl.expansion().is_empty());

        let top: Vec<String> = ctl
            .layout(AREA)
            .top_level()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(top, vec!["A", "B"]);
    }

    #[test]
    fn test_collapse_all_with_collapsible_root() {
        let mut ctl = controller(RootPolicy::Collapsible);
        assert_eq!(visible(&mut ctl), vec!["/root"]);
        ctl.expand(Path::new("/root")).unwrap();
        assert_eq!(visible(&mut ctl).len(), 3);
        ctl.collapse_all();
        assert_eq!(visible(&mut ctl), vec!["/root"]);
    }

    #[test]
    fn test_collapse_closes_containing_folder() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand_all(Path::new("/root")).unwrap();
        ctl.select(Path::new("/root/B/D/C")).unwrap();

        ctl.collapse_selected().unwrap();
        assert!(!ctl.expansion().is_expanded(Path::new("/root/B/D")));
        assert!(ctl.expansion().is_expanded(Path::new("/root/B")));
        // C is hidden now; D covers it
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/B/D")));
    }

    #[test]
    fn test_collapse_all_retargets_selection() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand_all(Path::new("/root")).unwrap();
        ctl.select(Path::new("/root/B/D/C")).unwrap();
        ctl.collapse_all();
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/B")));
    }

    #[test]
    fn test_select_not_found_keeps_state() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.select(Path::new("/root/A")).unwrap();
        assert_eq!(
            ctl.select(Path::new("/elsewhere")),
            Err(FrontierError::NotFound(PathBuf::from("/elsewhere")))
        );
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/A")));
    }

    #[test]
    fn test_point_selection_needs_fresh_layout() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        assert_eq!(ctl.select_at(Point::new(5, 5)), Err(FrontierError::StaleLayout));

        ctl.layout(AREA);
        ctl.expand(Path::new("/root/B")).unwrap();
        assert_eq!(ctl.select_at(Point::new(50, 5)), Err(FrontierError::StaleLayout));

        ctl.layout(AREA);
        let hit = ctl.select_at(Point::new(50, 5)).unwrap();
        assert_eq!(hit.map(|id| ctl.tree().node(id).name.clone()), Some("D".to_string()));
    }

    #[test]
    fn test_select_at_outside_keeps_selection() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.layout(AREA);
        ctl.select_at(Point::new(5, 5)).unwrap();
        ctl.layout(AREA);
        assert_eq!(ctl.select_at(Point::new(500, 5)).unwrap(), None);
        // a miss changes nothing
        assert!(ctl.current_layout().is_some());
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/A")));
    }

    #[test]
    fn test_toggle_at() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.layout(AREA);

        let first = ctl.toggle_at(Point::new(5, 5)).unwrap();
        assert!(first.is_some());
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/A")));

        ctl.layout(AREA);
        assert_eq!(ctl.toggle_at(Point::new(6, 6)).unwrap(), None);
        assert_eq!(ctl.selected(), None);

        ctl.layout(AREA);
        ctl.toggle_at(Point::new(90, 5)).unwrap();
        ctl.layout(AREA);
        ctl.toggle_at(Point::new(-3, 5)).unwrap();
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/B")));
    }

    #[test]
    fn test_selection_changes_drop_layout() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);

        ctl.layout(AREA);
        ctl.select(Path::new("/root/A")).unwrap();
        assert!(ctl.current_layout().is_none());
        assert_eq!(ctl.toggle_at(Point::new(5, 5)), Err(FrontierError::StaleLayout));

        ctl.layout(AREA);
        ctl.select_at(Point::new(50, 5)).unwrap();
        assert!(ctl.current_layout().is_none());

        ctl.layout(AREA);
        assert!(ctl.select_parent());
        assert!(ctl.current_layout().is_none());

        ctl.layout(AREA);
        ctl.clear_selection();
        assert!(ctl.current_layout().is_none());

        ctl.layout(AREA);
        ctl.toggle_at(Point::new(5, 5)).unwrap();
        assert!(ctl.current_layout().is_none());
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/A")));
    }

    #[test]
    fn test_layout_cache_follows_area() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        let wide = ctl.layout(AREA).get(Path::new("/root/A")).unwrap().rect;
        let tall = ctl
            .layout(Rect::new(0, 0, 10, 100))
            .get(Path::new("/root/A"))
            .unwrap()
            .rect;
        assert_eq!(wide, Rect::new(0, 0, 40, 10));
        assert_eq!(tall, Rect::new(0, 0, 10, 40));
    }

    #[test]
    fn test_selection_info_and_parent() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        assert!(ctl.selection_info().is_none());
        assert!(!ctl.select_parent());

        ctl.select(Path::new("/root/B/D/C")).unwrap();
        let info = ctl.selection_info().unwrap();
        let sep = std::path::MAIN_SEPARATOR;
        assert_eq!(info.kind, NodeKind::File);
        assert_eq!(info.size, 60);
        assert_eq!(info.label, format!("root{sep}B{sep}D{sep}C (file)  (60)"));

        assert!(ctl.select_parent());
        assert!(ctl.select_parent());
        assert_eq!(ctl.selected_path(), Some(Path::new("/root/B")));
        assert!(ctl.select_parent());
        assert!(!ctl.select_parent());
        assert_eq!(ctl.selected_path(), Some(Path::new("/root")));
    }

    #[test]
    fn test_selected_ops_without_selection_are_noops() {
        let mut ctl = controller(RootPolicy::AlwaysExpanded);
        ctl.expand_selected().unwrap();
        ctl.expand_all_selected().unwrap();
        ctl.collapse_selected().unwrap();
        assert!(ctl.expansion().is_empty());
    }
}
