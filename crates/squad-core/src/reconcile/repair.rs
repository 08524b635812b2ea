//! Restoring missing and modified files of an installed unit

use std::path::{Path, PathBuf};

use super::legacy::cleanup_legacy_yml;
use super::update::backup;
use super::writer::render_placeholder;
use super::{BackupRecord, InstallReport, PackAction, PackReport, ReconcileAction, Reconciler};
use crate::manifest::{IntegrityReport, Manifest, UnitMarker, check_integrity};
use crate::request::normalize_target;
use crate::{Error, Result};

/// A place a unit's files can be restored from.
struct RestoreSource {
    root: PathBuf,
    render: bool,
}

/// Result of repairing one unit.
#[derive(Debug, Default)]
pub(crate) struct UnitRepair {
    pub restored: Vec<String>,
    pub backups: Vec<BackupRecord>,
    pub removed_legacy: Vec<String>,
    pub warnings: Vec<String>,
}

impl Reconciler {
    /// Repair the core install in `target` and every damaged pack.
    ///
    /// The manifests are kept as they are.
    pub fn repair(&self, target: &Path) -> Result<InstallReport> {
        let target = normalize_target(target);
        let manifest = self
            .manifests
            .read(&target, &UnitMarker::Core)
            .require(&target)?;
        let integrity = check_integrity(&target, &manifest);
        let mut report = self.repair_with(&target, &manifest, &integrity)?;

        let state = self.classify(&target);
        for (pack_id, pack) in state.expansion_packs {
            let Some(pack_manifest) = pack.manifest else {
                continue;
            };
            let pack_integrity = check_integrity(&target, &pack_manifest);
            if pack_integrity.is_clean() {
                continue;
            }
            let repaired = self.repair_pack(&target, &pack_id, &pack_integrity)?;
            report.packs.push(PackReport {
                id: pack_id,
                version: pack_manifest.version.clone(),
                action: PackAction::Repaired,
                files: repaired.restored.clone(),
            });
            report.absorb_repair(repaired);
        }

        Ok(report)
    }

    /// Repair the core unit from a report the caller already computed.
    pub(crate) fn repair_with(
        &self,
        target: &Path,
        manifest: &Manifest,
        integrity: &IntegrityReport,
    ) -> Result<InstallReport> {
        let sources = [
            RestoreSource {
                root: self.source.primary_dir(),
                render: false,
            },
            RestoreSource {
                root: self.source.shared_dir(),
                render: true,
            },
        ];
        let repaired = repair_unit(target, &UnitMarker::Core, integrity, &sources)?;

        let mut report = InstallReport::new(ReconcileAction::Repair, target);
        report.version = Some(manifest.version.clone());
        report.absorb_repair(repaired);
        Ok(report)
    }

    /// Pack files come from the pack, then the shared store, then the
    /// primary store for back-filled agents and resources.
    pub(crate) fn repair_pack(
        &self,
        target: &Path,
        pack_id: &str,
        integrity: &IntegrityReport,
    ) -> Result<UnitRepair> {
        let sources = [
            RestoreSource {
                root: self.source.pack_dir(pack_id),
                render: false,
            },
            RestoreSource {
                root: self.source.shared_dir(),
                render: true,
            },
            RestoreSource {
                root: self.source.primary_dir(),
                render: false,
            },
        ];
        repair_unit(target, &UnitMarker::Pack(pack_id.to_string()), integrity, &sources)
    }
}

impl InstallReport {
    pub(crate) fn absorb_repair(&mut self, repaired: UnitRepair) {
        self.files.extend(repaired.restored.iter().cloned());
        self.restored.extend(repaired.restored);
        self.backups.extend(repaired.backups);
        self.removed_legacy.extend(repaired.removed_legacy);
        for warning in repaired.warnings {
            self.warn(warning);
        }
    }
}

fn repair_unit(
    target: &Path,
    marker: &UnitMarker,
    integrity: &IntegrityReport,
    sources: &[RestoreSource],
) -> Result<UnitRepair> {
    let marker_name = marker.dir_name();
    let mut repaired = UnitRepair::default();
    for path in &integrity.rejected {
        repaired
            .warnings
            .push(format!("{path} points outside the target, left alone"));
    }

    for path in &integrity.modified {
        repaired.backups.push(backup(target, path)?);
    }

    for path in integrity.missing.iter().chain(&integrity.modified) {
        let normalized = squad_fs::NormalizedPath::new(path);
        let Some(inner) = normalized.strip_dir(&marker_name) else {
            repaired
                .warnings
                .push(format!("{path} is outside {marker_name}, not restored"));
            continue;
        };

        let Some(source) = sources.iter().find(|s| s.root.join(inner).is_file()) else {
            repaired
                .warnings
                .push(format!("No source found for {path}, not restored"));
            continue;
        };

        let source_path = source.root.join(inner);
        let content = std::fs::read(&source_path).map_err(|e| Error::io(&source_path, e))?;
        let content = match (source.render, String::from_utf8(content)) {
            (true, Ok(text)) => render_placeholder(&text, &marker_name).into_bytes(),
            (_, Ok(text)) => text.into_bytes(),
            (_, Err(raw)) => raw.into_bytes(),
        };
        squad_fs::io::write_atomic(target.join(path), &content)?;
        tracing::debug!(path = %path, from = %source_path.display(), "Restored file");
        repaired.restored.push(path.clone());
    }

    repaired.removed_legacy = cleanup_legacy_yml(target, marker)?;
    tracing::info!(
        marker = %marker_name,
        restored = repaired.restored.len(),
        backups = repaired.backups.len(),
        "Repair complete"
    );
    Ok(repaired)
}
