use jwalk::{Parallelism, WalkDir};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::tree::{FileTree, NodeKind, TreeBuilder};

/// An entry the scanner could not read. It is kept in the tree as an empty file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableEntry {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScanStats {
    pub total_files: u64,
    pub total_dirs: u64,
    pub total_size: u64,
    pub duration_ms: u128,
    pub unreadable: Vec<UnreadableEntry>,
}

/// Walk `root` once and build a [`FileTree`] from it.
///
/// The walk is serial and name-sorted, so the same directory contents always
/// yield the same tree. Entries that cannot be read never abort the scan; they
/// are recorded in [`ScanStats::unreadable`] and kept as files of size 0.
pub fn scan<P: AsRef<Path>>(root: P, config: &ScanConfig) -> Result<(FileTree, ScanStats), ScanError> {
    let root_path = root.as_ref().to_path_buf();
    let start = Instant::now();

    let root_meta = if config.follow_links {
        std::fs::metadata(&root_path)
    } else {
        std::fs::symlink_metadata(&root_path)
    }
    .map_err(|source| ScanError::Root {
        path: root_path.clone(),
        source,
    })?;

    let mut stats = ScanStats::default();

    if !root_meta.is_dir() {
        stats.total_files = 1;
        stats.total_size = root_meta.len();
        let tree = TreeBuilder::new(&root_path, NodeKind::File, root_meta.len()).build();
        stats.duration_ms = start.elapsed().as_millis();
        return Ok((tree, stats));
    }

    let mut builder = TreeBuilder::new(&root_path, NodeKind::Folder, 0);
    stats.total_dirs = 1;

    let walker = WalkDir::new(&root_path)
        .skip_hidden(config.skip_hidden)
        .follow_links(config.follow_links)
        .sort(true)
        .parallelism(Parallelism::Serial)
        .min_depth(1);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let Some(path) = err.path().map(Path::to_path_buf) else {
                    tracing::warn!(error = %err, "walk error without a path");
                    continue;
                };
                record_unreadable(&mut builder, &mut stats, path, err.to_string());
                continue;
            }
        };

        let path = entry.path();

        if let Some(err) = entry.read_children_error.as_ref() {
            record_unreadable(&mut builder, &mut stats, path, err.to_string());
            continue;
        }

        if entry.file_type().is_dir() {
            if add_or_skip(&mut builder, path, NodeKind::Folder, 0) {
                stats.total_dirs += 1;
            }
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                let size = metadata.len();
                if add_or_skip(&mut builder, path, NodeKind::File, size) {
                    stats.total_files += 1;
                    stats.total_size = stats.total_size.saturating_add(size);
                }
            }
            Err(err) => {
                record_unreadable(&mut builder, &mut stats, path, err.to_string());
            }
        }
    }

    let tree = builder.build();
    stats.duration_ms = start.elapsed().as_millis();

    tracing::info!(
        root = %root_path.display(),
        files = stats.total_files,
        dirs = stats.total_dirs,
        bytes = tree.total_size(),
        unreadable = stats.unreadable.len(),
        elapsed_ms = stats.duration_ms as u64,
        "scan complete"
    );

    Ok((tree, stats))
}

fn add_or_skip(builder: &mut TreeBuilder, path: PathBuf, kind: NodeKind, size: u64) -> bool {
    match builder.add_entry(path, kind, size) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "entry skipped");
            false
        }
    }
}

fn record_unreadable(
    builder: &mut TreeBuilder,
    stats: &mut ScanStats,
    path: PathBuf,
    reason: String,
) {
    if let Err(err) = builder.mark_unreadable(&path) {
        tracing::warn!(path = %path.display(), %reason, error = %err, "unreadable entry dropped");
        return;
    }
    tracing::warn!(path = %path.display(), %reason, "unreadable entry recorded as empty file");
    stats.unreadable.push(UnreadableEntry { path, reason });
}
