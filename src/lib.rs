//! Interactive slice-and-partition treemaps of file-system snapshots.
//!
//! A [`FileTree`](tree::FileTree) is built once, either by [`crawler::scan`]
//! or from a [`SnapshotEntry`](snapshot::SnapshotEntry). A
//! [`FrontierController`](frontier::FrontierController) then tracks which
//! folders are expanded and which node is selected, and produces a fresh
//! [`Layout`](layout::Layout) whenever the frontier or the target area changes.

pub mod config;
pub mod crawler;
pub mod error;
pub mod expand_state;
pub mod frontier;
pub mod layout;
pub mod selection;
pub mod snapshot;
pub mod tree;
pub mod treemap;

pub use config::{FrontierConfig, RootPolicy, ScanConfig};
pub use error::{FrontierError, ScanError, TreeError};
pub use frontier::{FrontierController, SelectionInfo};
pub use layout::{compute_layout, LaidOutRect, Layout};
pub use tree::{FileTree, NodeKind, TreeNode};
pub use treemap::{Point, Rect};
