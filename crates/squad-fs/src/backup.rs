//! Side-by-side backups of user-modified files

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{Result, io};

/// Pick the first unused backup name for `path`.
///
/// The first candidate is `<file>.bak`, then `<file>.bak1`, `<file>.bak2`
/// and so on. An existing backup is never reused.
pub fn next_backup_path(path: &Path) -> PathBuf {
    let with_suffix = |suffix: String| {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    };

    let mut candidate = with_suffix(".bak".to_string());
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = with_suffix(format!(".bak{counter}"));
        counter += 1;
    }
    candidate
}

/// Copy `path` to its next free backup name and return that name.
pub fn backup_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let destination = next_backup_path(path);
    io::copy_file(path, &destination)?;
    tracing::debug!(original = %path.display(), backup = %destination.display(), "Backed up file");
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn first_backup_uses_plain_suffix() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("notes.md");
        fs::write(&file, "x").unwrap();

        assert_eq!(next_backup_path(&file), temp.path().join("notes.md.bak"));
    }

    #[test]
    fn backup_keeps_original_in_place() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("notes.md");
        fs::write(&file, "mine").unwrap();

        let backup = backup_file(&file).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "mine");
        assert_eq!(fs::read_to_string(backup).unwrap(), "mine");
    }

    #[test]
    fn backing_up_missing_file_fails() {
        let temp = tempfile::tempdir().unwrap();
        assert!(backup_file(temp.path().join("absent.md")).is_err());
    }
}
