//! Reconciliation: converging a target directory to the requested install
//!
//! [`Reconciler::install`] is the entry point. It classifies the target,
//! asks the caller to arbitrate where the path forks, and then runs one of
//! the operations:
//!
//! - fresh install: copy the resolved files and write a new manifest
//! - update: reinstall over an existing install using its recorded settings
//! - repair: restore missing and modified files, keeping the manifest
//! - reinstall: delete the unit directory, then fresh install
//!
//! Expansion packs follow the same operations scoped to `.<packId>`.

mod install;
mod legacy;
mod packs;
mod repair;
mod status;
mod update;
mod writer;

pub use legacy::cleanup_legacy_yml;
pub use status::{InstallStatus, PackStatus};
pub use writer::{ROOT_PLACEHOLDER, render_placeholder};

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::manifest::ManifestRepository;
use crate::source::SourceStore;
use crate::state::{InstallationState, StateClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileAction {
    FreshInstall,
    Update,
    Repair,
    Reinstall,
    ExpansionsOnly,
}

impl std::fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReconcileAction::FreshInstall => "install",
            ReconcileAction::Update => "update",
            ReconcileAction::Repair => "repair",
            ReconcileAction::Reinstall => "reinstall",
            ReconcileAction::ExpansionsOnly => "expansion install",
        };
        write!(f, "{name}")
    }
}

/// A file copied aside before being overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRecord {
    pub original: String,
    pub backup: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackAction {
    Installed,
    Reinstalled,
    Repaired,
    Skipped,
}

impl std::fmt::Display for PackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PackAction::Installed => "installed",
            PackAction::Reinstalled => "reinstalled",
            PackAction::Repaired => "repaired",
            PackAction::Skipped => "skipped",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackReport {
    pub id: String,
    pub version: String,
    pub action: PackAction,
    pub files: Vec<String>,
}

/// What a completed operation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallReport {
    pub action: ReconcileAction,
    pub target: PathBuf,
    /// Core version installed, when the core was written.
    pub version: Option<String>,
    /// Every path written, relative to the target, in write order.
    pub files: Vec<String>,
    /// Modified files left untouched at the caller's request.
    pub preserved: Vec<String>,
    pub restored: Vec<String>,
    pub backups: Vec<BackupRecord>,
    pub removed_legacy: Vec<String>,
    pub packs: Vec<PackReport>,
    pub warnings: Vec<String>,
}

impl InstallReport {
    pub fn new(action: ReconcileAction, target: &Path) -> Self {
        Self {
            action,
            target: target.to_path_buf(),
            version: None,
            files: Vec::new(),
            preserved: Vec::new(),
            restored: Vec::new(),
            backups: Vec::new(),
            removed_legacy: Vec::new(),
            packs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

/// How an operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(InstallReport),
    /// The caller chose to cancel before anything was written.
    Cancelled,
}

impl Outcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn report(&self) -> Option<&InstallReport> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Cancelled => None,
        }
    }
}

/// Runs reconciliation operations against target directories.
#[derive(Debug, Clone)]
pub struct Reconciler {
    source: SourceStore,
    manifests: ManifestRepository,
    classifier: StateClassifier,
}

impl Reconciler {
    pub fn new(source: SourceStore) -> Self {
        Self {
            source,
            manifests: ManifestRepository::new(),
            classifier: StateClassifier::new(),
        }
    }

    pub fn source(&self) -> &SourceStore {
        &self.source
    }

    pub fn manifests(&self) -> &ManifestRepository {
        &self.manifests
    }

    /// Classify `target` as it is right now.
    pub fn classify(&self, target: &Path) -> InstallationState {
        self.classifier.classify(target)
    }
}
