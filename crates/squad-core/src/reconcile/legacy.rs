//! One-way migration from `.yml` to `.yaml` file names

use std::path::Path;

use squad_fs::list_files;

use crate::Result;
use crate::manifest::UnitMarker;

/// Delete every `.yml` file in the unit's marker directory that now has a
/// `.yaml` twin. Returns the removed paths relative to `target`.
///
/// Files outside managed marker directories are never touched.
pub fn cleanup_legacy_yml(target: &Path, marker: &UnitMarker) -> Result<Vec<String>> {
    let marker_name = marker.dir_name();
    let dir = target.join(&marker_name);
    let mut removed = Vec::new();

    for file in list_files(&dir)? {
        if file.extension() != Some("yml") {
            continue;
        }
        let twin = file.with_extension("yaml");
        if dir.join(twin.to_native()).is_file() {
            squad_fs::io::remove_file(dir.join(file.to_native()))?;
            tracing::debug!(path = %file, "Removed legacy .yml file");
            removed.push(format!("{marker_name}/{file}"));
        }
    }

    if !removed.is_empty() {
        tracing::info!(count = removed.len(), marker = %marker_name, "Cleaned up legacy .yml files");
    }
    Ok(removed)
}
