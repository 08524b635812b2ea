//! Update and reinstall of the core unit

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use super::legacy::cleanup_legacy_yml;
use super::{BackupRecord, InstallReport, Outcome, ReconcileAction, Reconciler};
use crate::Result;
use crate::decision::{ChoiceId, DecisionKind, DecisionRequest, Decider, ask};
use crate::manifest::{InstallType, Manifest, UnitMarker, check_integrity};
use crate::request::{InstallRequest, normalize_target};
use crate::version::compare_versions;

impl Reconciler {
    /// Update the managed install in `target` to the available version.
    ///
    /// Fails with [`crate::Error::NoManagedInstall`] when there is no
    /// manifest and [`crate::Error::ManifestMalformed`] when it cannot be
    /// parsed.
    pub fn update(&self, target: &Path, decider: &mut dyn Decider) -> Result<Outcome> {
        let target = normalize_target(target);
        let manifest = self
            .manifests
            .read(&target, &UnitMarker::Core)
            .require(&target)?;
        self.update_with(&target, &manifest, decider)
    }

    pub(crate) fn update_with(
        &self,
        target: &Path,
        manifest: &Manifest,
        decider: &mut dyn Decider,
    ) -> Result<Outcome> {
        let available = self.source.core_version();
        let ordering = compare_versions(&manifest.version, &available);
        tracing::info!(
            installed = %manifest.version,
            available = %available,
            "Updating core install"
        );

        let mut report = InstallReport::new(ReconcileAction::Update, target);
        let mut preserve = HashSet::new();

        if ordering != Ordering::Equal {
            let integrity = check_integrity(target, manifest);
            if !integrity.modified.is_empty() {
                let mut decision = DecisionRequest::new(
                    DecisionKind::ModifiedFiles,
                    format!(
                        "{} installed files were modified since v{}",
                        integrity.modified.len(),
                        manifest.version
                    ),
                );
                for path in &integrity.modified {
                    decision = decision.detail(path.clone());
                }
                let decision = decision
                    .choice(ChoiceId::BackupAndOverwrite, "Back up modified files and overwrite them")
                    .choice(ChoiceId::SkipModified, "Keep modified files as they are")
                    .choice(ChoiceId::Cancel, "Cancel update")
                    .default_choice(ChoiceId::BackupAndOverwrite);

                match ask(decider, &decision)? {
                    ChoiceId::BackupAndOverwrite => {
                        for path in &integrity.modified {
                            report.backups.push(backup(target, path)?);
                        }
                    }
                    ChoiceId::SkipModified => preserve.extend(integrity.modified.iter().cloned()),
                    _ => return Ok(Outcome::Cancelled),
                }
            }
        }

        let install_type = match manifest.install_type {
            InstallType::SingleAgent if manifest.agent.is_none() => None,
            InstallType::Team if manifest.team.is_none() => None,
            recorded => Some(recorded),
        };
        let install_type = install_type.unwrap_or_else(|| {
            report.warn(format!(
                "Manifest records a {} install without its id, updating as a full install",
                manifest.install_type
            ));
            InstallType::Full
        });

        let request = InstallRequest {
            install_type,
            agent: manifest.agent.clone(),
            team: manifest.team.clone(),
            target_directory: target.to_path_buf(),
            language: None,
            ides: manifest.ides_configured.iter().cloned().collect(),
            expansion_packs: manifest.expansion_packs.clone(),
        };
        let core = self.write_core(&request, preserve)?;
        report.absorb_core(core);
        report.removed_legacy = cleanup_legacy_yml(target, &UnitMarker::Core)?;

        Ok(Outcome::Completed(report))
    }

    /// Delete the core unit directory, then fresh install.
    ///
    /// Pack decisions are gathered before anything is deleted.
    pub fn reinstall(&self, request: &InstallRequest, decider: &mut dyn Decider) -> Result<Outcome> {
        self.install_fresh_as(request, ReconcileAction::Reinstall, true, decider)
    }
}

/// Copy `relative` aside within `target` and record where it went.
pub(crate) fn backup(target: &Path, relative: &str) -> Result<BackupRecord> {
    let backup = squad_fs::backup_file(target.join(relative))?;
    Ok(BackupRecord {
        original: relative.to_string(),
        backup,
    })
}
