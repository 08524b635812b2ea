//! Slash-separated relative paths

use std::path::{Component, Path, PathBuf};

/// A path with forward slashes only.
///
/// Manifest entries and listed files use this form so a manifest written on
/// one platform reads back identically on another. Conversion to a native
/// path happens only when touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: path.as_ref().to_string_lossy().replace('\\', "/"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append `segment`. Joining onto an empty path yields the segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let inner = match self.inner.as_str() {
            "" => segment,
            base if base.ends_with('/') => format!("{base}{segment}"),
            base => format!("{base}/{segment}"),
        };
        Self { inner }
    }

    /// Remove a leading directory component.
    ///
    /// `".ai-squad-core/agents/dev.md".strip_dir(".ai-squad-core")` is
    /// `"agents/dev.md"`; a partial component never matches.
    pub fn strip_dir(&self, dir: &str) -> Option<&str> {
        self.inner
            .strip_prefix(dir.trim_end_matches('/'))
            .and_then(|rest| rest.strip_prefix('/'))
    }

    /// True when the path stays below whatever root it is joined onto:
    /// relative, non-empty and without `..` components.
    pub fn is_contained(&self) -> bool {
        !self.inner.is_empty()
            && !self.inner.starts_with('/')
            && Path::new(&self.inner)
                .components()
                .all(|part| matches!(part, Component::Normal(_) | Component::CurDir))
    }

    fn file_name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or(&self.inner)
    }

    /// Extension of the last component. Dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        match self.file_name().rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&self.file_name()[idx + 1..]),
        }
    }

    /// Replace the extension of the last component, or add one.
    pub fn with_extension(&self, extension: &str) -> Self {
        let stem = match self.extension() {
            Some(current) => &self.inner[..self.inner.len() - current.len() - 1],
            None => self.inner.as_str(),
        };
        Self {
            inner: format!("{stem}.{extension}"),
        }
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}
