use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::constants::paths;
use crate::error::{ChatError, Result};

/// A generated text product eligible for saving.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub title: String,
    pub content: String,
}

impl Artifact {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Writes artifacts as Markdown under a configurable root and remembers
/// what it wrote this session.
#[derive(Debug, Clone)]
pub struct OutputSink {
    root: PathBuf,
    recents: Vec<PathBuf>,
}

impl OutputSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recents: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where future saves land. Files already written stay where they are.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) -> &Path {
        self.root = root.into();
        &self.root
    }

    pub fn recents(&self) -> &[PathBuf] {
        &self.recents
    }

    pub fn record(&mut self, path: PathBuf) {
        self.recents.push(path);
    }

    pub fn save(&mut self, artifact: &Artifact) -> Result<PathBuf> {
        let path = write_artifact(&self.root, artifact, Local::now())?;
        self.record(path.clone());
        Ok(path)
    }
}

/// Write `artifact` to `<root>/<slug>.summary.<YYYYMMDD-HHMMSS>.md`, creating
/// `root` if needed. A name already taken within the same second gets a
/// `-2`, `-3`, ... suffix rather than being overwritten.
pub fn write_artifact(root: &Path, artifact: &Artifact, at: DateTime<Local>) -> Result<PathBuf> {
    std::fs::create_dir_all(root).map_err(|e| {
        ChatError::Config(format!(
            "Failed to create output directory {}: {e}",
            root.display()
        ))
    })?;

    let base = format!(
        "{}.{}.{}",
        slugify(&artifact.title),
        paths::ARTIFACT_SUFFIX,
        at.format("%Y%m%d-%H%M%S")
    );

    let mut attempt = 1;
    loop {
        let filename = if attempt == 1 {
            format!("{base}.{}", paths::ARTIFACT_EXTENSION)
        } else {
            format!("{base}-{attempt}.{}", paths::ARTIFACT_EXTENSION)
        };
        let path = root.join(filename);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(artifact.content.as_bytes())?;
                tracing::info!("Saved artifact to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Filesystem-safe name derived from a title. A title that looks like a
/// file name loses its extension.
pub fn slugify(title: &str) -> String {
    let stem = Path::new(title.trim())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let slug: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let slug = slug.trim_matches('.').to_string();
    if slug.is_empty() {
        "artifact".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn slug_drops_extension_and_spaces() {
        assert_eq!(slugify("main.rs"), "main");
        assert_eq!(slugify("My Notes.txt"), "My_Notes");
        assert_eq!(slugify("what/is:this?"), "is_this_");
        assert_eq!(slugify(""), "artifact");
        assert_eq!(slugify("..."), "artifact");
    }

    #[test]
    fn writes_timestamped_markdown_and_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out").join("nested");
        let artifact = Artifact::new("main.rs", "# Summary\nIt runs.");

        let path = write_artifact(&root, &artifact, fixed_time()).unwrap();

        assert_eq!(path, root.join("main.summary.20240506-070809.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Summary\nIt runs.");
    }

    #[test]
    fn same_second_collision_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let artifact = Artifact::new("main.rs", "first");
        let first = write_artifact(dir.path(), &artifact, fixed_time()).unwrap();
        let second =
            write_artifact(dir.path(), &Artifact::new("main.rs", "second"), fixed_time()).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_string_lossy(),
            "main.summary.20240506-070809-2.md"
        );
        assert_eq!(std::fs::read_to_string(first).unwrap(), "first");
    }

    #[test]
    fn set_root_only_affects_future_saves() {
        let dir = TempDir::new().unwrap();
        let mut sink = OutputSink::new(dir.path().join("a"));
        let first = sink.save(&Artifact::new("one", "1")).unwrap();

        let new_root = sink.set_root(dir.path().join("b")).to_path_buf();
        let second = sink.save(&Artifact::new("two", "2")).unwrap();

        assert!(first.starts_with(dir.path().join("a")));
        assert!(first.exists());
        assert!(second.starts_with(&new_root));
        assert_eq!(sink.recents(), &[first, second]);
    }
}
