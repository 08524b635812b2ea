//! Integrity classification of tracked files

use std::path::Path;

use serde::Serialize;
use squad_fs::{NormalizedPath, SquadPath, fingerprint_file};

use super::{FileRecord, Manifest};

/// Tracked files that no longer match their manifest record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub missing: Vec<String>,
    pub modified: Vec<String>,
    /// Records pointing outside the target root. Never read or written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.modified.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.missing.len() + self.modified.len()
    }
}

enum FileState {
    Missing,
    Modified,
    Untouched,
}

fn classify(target: &Path, record: &FileRecord) -> FileState {
    let path = target.join(&record.path);
    if !path.exists() {
        return FileState::Missing;
    }
    if fingerprint_file(&path) == record.hash {
        FileState::Untouched
    } else {
        FileState::Modified
    }
}

/// Compare every tracked file on disk against its recorded fingerprint.
///
/// Manifest files are never checked against themselves. Each record is
/// classified independently of the others, in manifest order. Absolute
/// paths and paths climbing out with `..` land in `rejected` and are
/// never resolved against `target`.
pub fn check_integrity(target: &Path, manifest: &Manifest) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    for record in &manifest.files {
        if record.path.ends_with(SquadPath::ManifestFile.as_str()) {
            continue;
        }
        if !NormalizedPath::new(&record.path).is_contained() {
            tracing::warn!(path = %record.path, "Manifest entry escapes the target, ignoring");
            report.rejected.push(record.path.clone());
            continue;
        }
        match classify(target, record) {
            FileState::Missing => report.missing.push(record.path.clone()),
            FileState::Modified => report.modified.push(record.path.clone()),
            FileState::Untouched => {}
        }
    }

    if !report.is_clean() {
        tracing::debug!(
            missing = report.missing.len(),
            modified = report.modified.len(),
            "Integrity issues found"
        );
    }
    report
}
