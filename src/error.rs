//! Error types for treescape.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling a [`FileTree`](crate::tree::FileTree).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Two entries share the same full path.
    #[error("duplicate path: {0}")]
    DuplicatePath(PathBuf),

    /// The entry's parent folder has not been added yet.
    #[error("parent of {0} is not in the tree")]
    OrphanEntry(PathBuf),

    /// The entry does not live under the tree root.
    #[error("{0} is outside the tree root")]
    OutsideRoot(PathBuf),
}

/// Errors raised by the file-system scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root path itself cannot be stat'ed.
    #[error("cannot read scan root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by [`FrontierController`](crate::frontier::FrontierController) operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontierError {
    /// No node in the tree has this path.
    #[error("no node at {0}")]
    NotFound(PathBuf),

    /// A point lookup was attempted after a mutation invalidated the layout.
    #[error("layout is stale; recompute it before resolving points")]
    StaleLayout,
}
