//! Reading and writing manifests under a target root

use std::path::{Path, PathBuf};

use squad_fs::constants::pack_marker;
use squad_fs::{ConfigStore, SquadPath};

use super::{IntegrityReport, Manifest, check_integrity};
use crate::{Error, Result};

/// Identifies which install unit a marker directory belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitMarker {
    Core,
    Pack(String),
}

impl UnitMarker {
    /// Name of the hidden directory holding the unit.
    pub fn dir_name(&self) -> String {
        match self {
            UnitMarker::Core => SquadPath::CoreMarker.as_str().to_string(),
            UnitMarker::Pack(id) => pack_marker(id),
        }
    }

    /// Manifest location relative to the target root.
    pub fn manifest_relative(&self) -> String {
        format!("{}/{}", self.dir_name(), SquadPath::ManifestFile)
    }
}

/// Outcome of reading a manifest. Reading never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestStatus {
    Present(Manifest),
    Absent,
    Malformed { path: PathBuf, diagnostic: String },
}

impl ManifestStatus {
    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            ManifestStatus::Present(manifest) => Some(manifest),
            _ => None,
        }
    }

    pub fn into_manifest(self) -> Option<Manifest> {
        match self {
            ManifestStatus::Present(manifest) => Some(manifest),
            _ => None,
        }
    }

    /// Turn the status into a manifest, failing on absence or bad content.
    ///
    /// Top-level operations that cannot proceed without a manifest use this.
    pub fn require(self, target: &Path) -> Result<Manifest> {
        match self {
            ManifestStatus::Present(manifest) => Ok(manifest),
            ManifestStatus::Absent => Err(Error::NoManagedInstall {
                path: target.to_path_buf(),
            }),
            ManifestStatus::Malformed { path, diagnostic } => Err(Error::ManifestMalformed {
                path,
                reason: diagnostic,
            }),
        }
    }
}

/// Persists manifests at their fixed location below a target root.
#[derive(Debug, Clone, Default)]
pub struct ManifestRepository {
    store: ConfigStore,
}

impl ManifestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifest_path(target: &Path, marker: &UnitMarker) -> PathBuf {
        target
            .join(marker.dir_name())
            .join(SquadPath::ManifestFile)
    }

    /// Serialize `manifest`, replacing whatever was there.
    pub fn write(&self, target: &Path, marker: &UnitMarker, manifest: &Manifest) -> Result<()> {
        let path = Self::manifest_path(target, marker);
        self.store.save(&path, manifest)?;
        tracing::info!(
            path = %path.display(),
            files = manifest.files.len(),
            "Wrote install manifest"
        );
        Ok(())
    }

    pub fn read(&self, target: &Path, marker: &UnitMarker) -> ManifestStatus {
        let path = Self::manifest_path(target, marker);
        match squad_fs::io::read_text(&path) {
            Ok(content) => self.parse(&path, &content),
            Err(e) if e.is_not_found() => ManifestStatus::Absent,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Manifest unreadable");
                ManifestStatus::Malformed {
                    path,
                    diagnostic: e.to_string(),
                }
            }
        }
    }

    /// Parse manifest text already read from `path`.
    pub fn parse(&self, path: &Path, content: &str) -> ManifestStatus {
        match self.store.parse::<Manifest>(path, content) {
            Ok(manifest) => ManifestStatus::Present(manifest),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Manifest malformed");
                ManifestStatus::Malformed {
                    path: path.to_path_buf(),
                    diagnostic: e.to_string(),
                }
            }
        }
    }

    pub fn check_integrity(&self, target: &Path, manifest: &Manifest) -> IntegrityReport {
        check_integrity(target, manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FileRecord, InstallType};
    use pretty_assertions::assert_eq;

    #[test]
    fn marker_directories() {
        assert_eq!(UnitMarker::Core.dir_name(), ".ai-squad-core");
        assert_eq!(UnitMarker::Pack("infra".into()).dir_name(), ".infra");
        assert_eq!(
            UnitMarker::Core.manifest_relative(),
            ".ai-squad-core/install-manifest.yaml"
        );
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let repo = ManifestRepository::new();
        let mut manifest = Manifest::new("2.1.0", InstallType::Full).with_files(vec![FileRecord {
            path: ".ai-squad-core/agents/dev.md".into(),
            hash: Some("0011223344556677".into()),
            modified: false,
        }]);
        manifest.ides_configured.insert("cursor".into());

        repo.write(temp.path(), &UnitMarker::Core, &manifest).unwrap();
        let read = repo.read(temp.path(), &UnitMarker::Core);

        assert_eq!(read, ManifestStatus::Present(manifest));
    }

    #[test]
    fn absent_manifest_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let status = ManifestRepository::new().read(temp.path(), &UnitMarker::Core);
        assert_eq!(status, ManifestStatus::Absent);
        assert!(matches!(
            status.require(temp.path()),
            Err(Error::NoManagedInstall { .. })
        ));
    }

    #[test]
    fn malformed_manifest_carries_diagnostic() {
        let temp = tempfile::tempdir().unwrap();
        let path = ManifestRepository::manifest_path(temp.path(), &UnitMarker::Core);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "version: [unclosed").unwrap();

        let status = ManifestRepository::new().read(temp.path(), &UnitMarker::Core);

        assert!(matches!(status, ManifestStatus::Malformed { .. }));
        assert!(matches!(
            status.require(temp.path()),
            Err(Error::ManifestMalformed { .. })
        ));
    }
}
