use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::constants::limits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerEntry {
    /// Path relative to the explorer root.
    pub relative: PathBuf,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// List the tree under `root`, honouring `.gitignore`. Directories come
/// first at each level, then files, both by name.
pub fn list_entries(root: &Path, recursive: bool) -> Vec<ExplorerEntry> {
    let mut builder = WalkBuilder::new(root);
    builder.hidden(true).git_ignore(true).git_global(true);
    if !recursive {
        builder.max_depth(Some(1));
    }
    builder.sort_by_file_path(|a, b| a.cmp(b));

    let mut entries = Vec::new();
    for entry in builder.build().flatten() {
        if entry.depth() == 0 {
            continue;
        }

        let entry_path = entry.path().to_path_buf();
        let relative = entry_path
            .strip_prefix(root)
            .unwrap_or(entry_path.as_path())
            .to_path_buf();

        entries.push(ExplorerEntry {
            relative,
            is_dir: entry.file_type().is_some_and(|ft| ft.is_dir()),
            path: entry_path,
        });

        if entries.len() >= limits::MAX_EXPLORER_ENTRIES {
            break;
        }
    }

    entries.sort_by(|a, b| {
        let parent_a = a.relative.parent();
        let parent_b = b.relative.parent();
        parent_a
            .cmp(&parent_b)
            .then(b.is_dir.cmp(&a.is_dir))
            .then(a.relative.cmp(&b.relative))
    });
    entries
}
