//! Writes one unit's files below its marker directory and tracks them

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use squad_fs::{fingerprint_bytes, list_files};

use crate::manifest::{FileRecord, UnitMarker};
use crate::{Error, Result};

/// Token in shared files replaced by the destination marker directory.
pub const ROOT_PLACEHOLDER: &str = "{root}";

/// Replace every root placeholder with `marker`.
pub fn render_placeholder(content: &str, marker: &str) -> String {
    content.replace(ROOT_PLACEHOLDER, marker)
}

/// Collects the files written for one unit, in write order.
///
/// The first write to a path wins; later writes to the same path are
/// ignored. Paths in the preserve set are recorded but left on disk as they
/// are.
#[derive(Debug)]
pub(crate) struct UnitWriter {
    target: PathBuf,
    marker: String,
    preserve: HashSet<String>,
    seen: HashSet<String>,
    records: Vec<FileRecord>,
    preserved: Vec<String>,
}

impl UnitWriter {
    pub fn new(target: &Path, marker: &UnitMarker) -> Self {
        Self {
            target: target.to_path_buf(),
            marker: marker.dir_name(),
            preserve: HashSet::new(),
            seen: HashSet::new(),
            records: Vec::new(),
            preserved: Vec::new(),
        }
    }

    pub fn preserve(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.preserve.extend(paths);
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Target-relative path for a path inside the marker directory.
    pub fn relative(&self, inner: &str) -> String {
        format!("{}/{}", self.marker, inner)
    }

    pub fn contains(&self, inner: &str) -> bool {
        self.seen.contains(&self.relative(inner))
    }

    pub fn write(&mut self, inner: &str, content: &[u8]) -> Result<bool> {
        let relative = self.relative(inner);
        if !self.seen.insert(relative.clone()) {
            tracing::debug!(path = %relative, "Already written, keeping first");
            return Ok(false);
        }

        let hash = Some(fingerprint_bytes(content));
        let modified = self.preserve.contains(&relative);
        if modified {
            tracing::debug!(path = %relative, "Preserving modified file");
            self.preserved.push(relative.clone());
        } else {
            squad_fs::io::write_atomic(self.target.join(&relative), content)?;
            tracing::debug!(path = %relative, "Wrote file");
        }

        self.records.push(FileRecord {
            path: relative,
            hash,
            modified,
        });
        Ok(true)
    }

    /// Copy a source file verbatim.
    pub fn copy(&mut self, source: &Path, inner: &str) -> Result<bool> {
        if self.contains(inner) {
            return Ok(false);
        }
        let content = fs::read(source).map_err(|e| Error::io(source, e))?;
        self.write(inner, &content)
    }

    /// Copy a shared-store file with the root placeholder substituted.
    ///
    /// Non-UTF-8 files are copied verbatim.
    pub fn render(&mut self, source: &Path, inner: &str) -> Result<bool> {
        if self.contains(inner) {
            return Ok(false);
        }
        let content = fs::read(source).map_err(|e| Error::io(source, e))?;
        match String::from_utf8(content) {
            Ok(text) => {
                let rendered = render_placeholder(&text, &self.marker);
                self.write(inner, rendered.as_bytes())
            }
            Err(raw) => self.write(inner, raw.as_bytes()),
        }
    }

    /// Copy every file under `dir` to `prefix/<relative>`.
    pub fn copy_tree(&mut self, dir: &Path, prefix: &str, render: bool) -> Result<usize> {
        let mut written = 0;
        for file in list_files(dir)? {
            let inner = if prefix.is_empty() {
                file.as_str().to_string()
            } else {
                format!("{prefix}/{}", file.as_str())
            };
            let source = dir.join(file.to_native());
            let wrote = if render {
                self.render(&source, &inner)?
            } else {
                self.copy(&source, &inner)?
            };
            written += usize::from(wrote);
        }
        Ok(written)
    }

    pub fn finish(self) -> WrittenUnit {
        WrittenUnit {
            records: self.records,
            preserved: self.preserved,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct WrittenUnit {
    pub records: Vec<FileRecord>,
    pub preserved: Vec<String>,
}

impl WrittenUnit {
    pub fn paths(&self) -> Vec<String> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }
}
