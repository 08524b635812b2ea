//! Classifying what is already installed in a target directory

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use squad_fs::SquadPath;
use squad_fs::walk::IGNORED_DIRS;

use crate::manifest::{Manifest, ManifestRepository, ManifestStatus, UnitMarker};

/// Directory entry as seen by a [`TargetProbe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEntry {
    pub name: String,
    pub is_dir: bool,
}

/// The filesystem queries the classifier needs.
pub trait TargetProbe {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<ProbeEntry>>;
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// [`TargetProbe`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProbe;

impl TargetProbe for OsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<ProbeEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(ProbeEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        fs::read_to_string(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallationKind {
    Clean,
    ExistingManaged,
    ExistingLegacy,
    ExistingUnmanaged,
}

/// A hidden directory recognized as an installed expansion pack.
#[derive(Debug, Clone, PartialEq)]
pub struct PackState {
    pub has_manifest: bool,
    pub manifest: Option<Manifest>,
}

/// What the classifier found. Never cached across operations.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallationState {
    pub kind: InstallationKind,
    pub manifest: Option<Manifest>,
    /// The directory holds unrelated files but no markers.
    pub non_empty: bool,
    pub expansion_packs: BTreeMap<String, PackState>,
    pub diagnostics: Vec<String>,
}

impl InstallationState {
    fn new(kind: InstallationKind) -> Self {
        Self {
            kind,
            manifest: None,
            non_empty: false,
            expansion_packs: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// Inspects a target directory and decides which reconciliation path applies.
#[derive(Debug, Clone, Default)]
pub struct StateClassifier<P: TargetProbe = OsProbe> {
    probe: P,
    manifests: ManifestRepository,
}

impl StateClassifier<OsProbe> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: TargetProbe> StateClassifier<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe,
            manifests: ManifestRepository::new(),
        }
    }

    pub fn classify(&self, target: &Path) -> InstallationState {
        if !self.probe.is_dir(target) {
            return InstallationState::new(InstallationKind::Clean);
        }

        let mut state = self.classify_core(target);
        self.detect_packs(target, &mut state);
        tracing::debug!(
            target = %target.display(),
            kind = ?state.kind,
            packs = state.expansion_packs.len(),
            "Classified target"
        );
        state
    }

    fn classify_core(&self, target: &Path) -> InstallationState {
        let core_dir = target.join(SquadPath::CoreMarker);
        let manifest_path = ManifestRepository::manifest_path(target, &UnitMarker::Core);
        let mut diagnostics = Vec::new();

        if self.probe.exists(&manifest_path) {
            match self.read_manifest(&manifest_path) {
                ManifestStatus::Present(manifest) => {
                    let mut state = InstallationState::new(InstallationKind::ExistingManaged);
                    state.manifest = Some(manifest);
                    return state;
                }
                ManifestStatus::Malformed { diagnostic, .. } => diagnostics.push(diagnostic),
                ManifestStatus::Absent => {}
            }
        }

        let kind = if self.probe.is_dir(&target.join(SquadPath::LegacyMarker)) {
            InstallationKind::ExistingLegacy
        } else if self.probe.is_dir(&core_dir) {
            InstallationKind::ExistingUnmanaged
        } else {
            InstallationKind::Clean
        };

        let mut state = InstallationState::new(kind);
        state.diagnostics = diagnostics;
        if kind == InstallationKind::Clean {
            state.non_empty = self.has_files(target);
        }
        state
    }

    fn read_manifest(&self, path: &Path) -> ManifestStatus {
        match self.probe.read_to_string(path) {
            Ok(content) => self.manifests.parse(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ManifestStatus::Absent,
            Err(e) => ManifestStatus::Malformed {
                path: path.to_path_buf(),
                diagnostic: e.to_string(),
            },
        }
    }

    /// Hidden directories holding a pack manifest or a pack config.
    fn detect_packs(&self, target: &Path, state: &mut InstallationState) {
        let entries = match self.probe.read_dir(target) {
            Ok(entries) => entries,
            Err(e) => {
                state.diagnostics.push(format!("{}: {e}", target.display()));
                return;
            }
        };

        for entry in entries {
            if !entry.is_dir || !entry.name.starts_with('.') {
                continue;
            }
            if entry.name == SquadPath::CoreMarker.as_str() || entry.name == ".git" {
                continue;
            }

            let dir = target.join(&entry.name);
            let manifest_path = dir.join(SquadPath::ManifestFile);
            let has_manifest = self.probe.exists(&manifest_path);
            let has_config = self.probe.exists(&dir.join(SquadPath::PackConfig));
            if !has_manifest && !has_config {
                continue;
            }

            let manifest = if has_manifest {
                match self.read_manifest(&manifest_path) {
                    ManifestStatus::Present(manifest) => Some(manifest),
                    ManifestStatus::Malformed { diagnostic, .. } => {
                        state.diagnostics.push(diagnostic);
                        None
                    }
                    ManifestStatus::Absent => None,
                }
            } else {
                None
            };

            let pack_id = entry.name.trim_start_matches('.').to_string();
            state.expansion_packs.insert(
                pack_id,
                PackState {
                    has_manifest,
                    manifest,
                },
            );
        }
    }

    fn has_files(&self, dir: &Path) -> bool {
        let Ok(entries) = self.probe.read_dir(dir) else {
            return false;
        };
        entries.iter().any(|entry| {
            if !entry.is_dir {
                return true;
            }
            !IGNORED_DIRS.contains(&entry.name.as_str()) && self.has_files(&dir.join(&entry.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// In-memory tree: a path maps to file content, or `None` for a directory.
    #[derive(Default)]
    struct MemoryProbe {
        nodes: BTreeMap<PathBuf, Option<String>>,
    }

    impl MemoryProbe {
        fn dir(mut self, path: &str) -> Self {
            let mut current = PathBuf::new();
            for part in Path::new(path).components() {
                current.push(part);
                self.nodes.entry(current.clone()).or_insert(None);
            }
            self
        }

        fn file(self, path: &str, content: &str) -> Self {
            let path = PathBuf::from(path);
            let mut probe = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    self.dir(&parent.to_string_lossy())
                }
                _ => self,
            };
            probe.nodes.insert(path, Some(content.to_string()));
            probe
        }
    }

    impl TargetProbe for MemoryProbe {
        fn exists(&self, path: &Path) -> bool {
            self.nodes.contains_key(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            matches!(self.nodes.get(path), Some(None))
        }

        fn read_dir(&self, path: &Path) -> std::io::Result<Vec<ProbeEntry>> {
            Ok(self
                .nodes
                .iter()
                .filter(|(p, _)| p.parent() == Some(path))
                .map(|(p, node)| ProbeEntry {
                    name: p.file_name().unwrap().to_string_lossy().to_string(),
                    is_dir: node.is_none(),
                })
                .collect())
        }

        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            match self.nodes.get(path) {
                Some(Some(content)) => Ok(content.clone()),
                _ => Err(std::io::ErrorKind::NotFound.into()),
            }
        }
    }

    const MANIFEST: &str = "version: 1.0.0\ninstalled_at: 2024-01-01T00:00:00Z\ninstall_type: full\nfiles: []\n";

    fn classify(probe: MemoryProbe) -> InstallationState {
        StateClassifier::with_probe(probe).classify(Path::new("proj"))
    }

    #[test]
    fn missing_directory_is_clean() {
        let state = classify(MemoryProbe::default());
        assert_eq!(state.kind, InstallationKind::Clean);
        assert!(!state.non_empty);
    }

    #[test]
    fn unrelated_files_are_clean_but_non_empty() {
        let state = classify(MemoryProbe::default().file("proj/src/main.rs", "fn main() {}"));
        assert_eq!(state.kind, InstallationKind::Clean);
        assert!(state.non_empty);
    }

    #[test]
    fn git_only_directory_is_empty() {
        let state = classify(MemoryProbe::default().file("proj/.git/HEAD", "ref"));
        assert!(!state.non_empty);
    }

    #[test]
    fn manifest_means_managed() {
        let state = classify(
            MemoryProbe::default().file("proj/.ai-squad-core/install-manifest.yaml", MANIFEST),
        );
        assert_eq!(state.kind, InstallationKind::ExistingManaged);
        assert_eq!(state.manifest.unwrap().version, "1.0.0");
    }

    #[test]
    fn legacy_marker_without_manifest() {
        let state = classify(MemoryProbe::default().file("proj/bmad-agent/agents/dev.md", "x"));
        assert_eq!(state.kind, InstallationKind::ExistingLegacy);
    }

    #[test]
    fn marker_without_manifest_is_unmanaged() {
        let state = classify(MemoryProbe::default().file("proj/.ai-squad-core/agents/dev.md", "x"));
        assert_eq!(state.kind, InstallationKind::ExistingUnmanaged);
    }

    #[test]
    fn malformed_manifest_is_unmanaged_with_diagnostic() {
        let state = classify(
            MemoryProbe::default().file("proj/.ai-squad-core/install-manifest.yaml", "files: [oops"),
        );
        assert_eq!(state.kind, InstallationKind::ExistingUnmanaged);
        assert_eq!(state.diagnostics.len(), 1);
    }

    #[test]
    fn packs_detected_regardless_of_core_state() {
        let state = classify(
            MemoryProbe::default()
                .file("proj/.infra/config.yaml", "name: Infra")
                .file(
                    "proj/.game-dev/install-manifest.yaml",
                    &MANIFEST.replace("full", "expansion-pack"),
                )
                .dir("proj/.vscode"),
        );

        assert_eq!(state.kind, InstallationKind::Clean);
        let ids: Vec<_> = state.expansion_packs.keys().cloned().collect();
        assert_eq!(ids, vec!["game-dev", "infra"]);
        assert!(!state.expansion_packs["infra"].has_manifest);
        assert!(state.expansion_packs["game-dev"].manifest.is_some());
    }
}
