//! Read-only summary of an installation

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Reconciler;
use crate::manifest::{InstallType, IntegrityReport, check_integrity};
use crate::request::normalize_target;
use crate::state::InstallationKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackStatus {
    pub id: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub has_manifest: bool,
    pub integrity: Option<IntegrityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallStatus {
    pub target: PathBuf,
    pub kind: InstallationKind,
    pub version: Option<String>,
    pub available_version: String,
    pub installed_at: Option<DateTime<Utc>>,
    pub install_type: Option<InstallType>,
    pub agent: Option<String>,
    pub team: Option<String>,
    pub ides: Vec<String>,
    pub total_files: usize,
    pub integrity: Option<IntegrityReport>,
    pub packs: Vec<PackStatus>,
    pub diagnostics: Vec<String>,
}

impl InstallStatus {
    /// Whether the core and every pack match their manifests.
    pub fn is_healthy(&self) -> bool {
        let core_clean = self.integrity.as_ref().is_none_or(IntegrityReport::is_clean);
        let packs_clean = self
            .packs
            .iter()
            .all(|pack| pack.integrity.as_ref().is_none_or(IntegrityReport::is_clean));
        core_clean && packs_clean
    }
}

impl Reconciler {
    /// Classify `target` and check integrity of everything it manages.
    pub fn status(&self, target: &Path) -> InstallStatus {
        let target = normalize_target(target);
        let state = self.classify(&target);

        let packs = state
            .expansion_packs
            .iter()
            .map(|(id, pack)| PackStatus {
                id: id.clone(),
                name: pack
                    .manifest
                    .as_ref()
                    .and_then(|m| m.expansion_pack_name.clone()),
                version: pack.manifest.as_ref().map(|m| m.version.clone()),
                has_manifest: pack.has_manifest,
                integrity: pack.manifest.as_ref().map(|m| check_integrity(&target, m)),
            })
            .collect();

        let manifest = state.manifest.as_ref();
        InstallStatus {
            kind: state.kind,
            version: manifest.map(|m| m.version.clone()),
            available_version: self.source.core_version(),
            installed_at: manifest.map(|m| m.installed_at),
            install_type: manifest.map(|m| m.install_type),
            agent: manifest.and_then(|m| m.agent.clone()),
            team: manifest.and_then(|m| m.team.clone()),
            ides: manifest
                .map(|m| m.ides_configured.iter().cloned().collect())
                .unwrap_or_default(),
            total_files: manifest.map_or(0, |m| m.files.len()),
            integrity: manifest.map(|m| check_integrity(&target, m)),
            packs,
            diagnostics: state.diagnostics.clone(),
            target,
        }
    }
}
