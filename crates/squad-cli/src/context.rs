//! Installation context detection
//!
//! Commands that act on an existing installation work from any directory
//! inside the project, the way git commands do.

use std::path::{Path, PathBuf};

use squad_core::{ManifestRepository, UnitMarker};

/// Walk up from `start` to the first directory holding a core manifest.
pub fn find_installation(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| ManifestRepository::manifest_path(dir, &UnitMarker::Core).is_file())
        .map(Path::to_path_buf)
}

/// The explicit directory if given, else the nearest installation above the
/// working directory, else the working directory itself.
pub fn resolve_target(directory: Option<PathBuf>) -> std::io::Result<PathBuf> {
    if let Some(directory) = directory {
        return Ok(directory);
    }
    let cwd = std::env::current_dir()?;
    let target = find_installation(&cwd).unwrap_or(cwd);
    tracing::debug!(target = %target.display(), "Resolved target directory");
    Ok(target)
}
