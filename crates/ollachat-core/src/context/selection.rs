use std::path::{Path, PathBuf};

/// Ordered, duplicate-free set of files attached to the next prompts.
#[derive(Debug, Clone, Default)]
pub struct ContextSelection {
    files: Vec<PathBuf>,
}

impl ContextSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file. Returns false for directories, missing paths and
    /// files already present.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !path.is_file() || self.contains(&path) {
            return false;
        }
        self.files.push(path);
        true
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.files.len();
        self.files.retain(|p| p != path);
        self.files.len() != before
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|p| p == path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
