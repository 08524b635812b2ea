//! Atomic I/O operations with file locking

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
/// Parent directories are created as needed.
pub fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let native_path = path.as_ref();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;

    fs::rename(&temp_path, native_path).map_err(|e| Error::io(native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let native_path = path.as_ref();
    fs::read_to_string(native_path).map_err(|e| Error::io(native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: impl AsRef<Path>, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Copy a file, creating the destination's parent directories.
pub fn copy_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(source, destination).map_err(|e| Error::io(source, e))?;
    Ok(())
}

/// Create a directory and all of its parents.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Remove a directory tree if it exists.
pub fn remove_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Remove a single file.
pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}
