//! Install manifests: the record of what a unit installed
//!
//! One manifest exists per install unit, at
//! `<marker>/install-manifest.yaml`, where the marker is `.ai-squad-core`
//! for the core and `.<packId>` for an expansion pack.

mod integrity;
mod repository;

pub use integrity::{IntegrityReport, check_integrity};
pub use repository::{ManifestRepository, ManifestStatus, UnitMarker};

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of install produced a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallType {
    Full,
    SingleAgent,
    Team,
    ExpansionPack,
    ExpansionOnly,
}

impl InstallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallType::Full => "full",
            InstallType::SingleAgent => "single-agent",
            InstallType::Team => "team",
            InstallType::ExpansionPack => "expansion-pack",
            InstallType::ExpansionOnly => "expansion-only",
        }
    }
}

impl std::fmt::Display for InstallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked file, relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub hash: Option<String>,
    #[serde(default)]
    pub modified: bool,
}

/// A persisted install record.
///
/// Field names are written in snake_case; camelCase spellings are accepted
/// on read. Unknown fields are ignored so newer manifests stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,

    #[serde(alias = "installedAt")]
    pub installed_at: DateTime<Utc>,

    #[serde(alias = "installType")]
    pub install_type: InstallType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, rename = "ides_setup", alias = "idesConfigured")]
    pub ides_configured: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expansion_packs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion_pack_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansion_pack_name: Option<String>,

    #[serde(default)]
    pub files: Vec<FileRecord>,
}

impl Manifest {
    /// A manifest stamped with the current time and no files.
    pub fn new(version: impl Into<String>, install_type: InstallType) -> Self {
        Self {
            version: version.into(),
            installed_at: Utc::now(),
            install_type,
            agent: None,
            team: None,
            ides_configured: BTreeSet::new(),
            expansion_packs: Vec::new(),
            expansion_pack_id: None,
            expansion_pack_name: None,
            files: Vec::new(),
        }
    }

    /// Set the tracked files, keeping the first record for any repeated path.
    pub fn with_files(mut self, files: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut seen = HashSet::new();
        self.files = files
            .into_iter()
            .filter(|record| seen.insert(record.path.clone()))
            .collect();
        self
    }

    pub fn find(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|record| record.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|record| record.path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, hash: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            hash: Some(hash.to_string()),
            modified: false,
        }
    }

    #[test]
    fn with_files_keeps_first_duplicate() {
        let manifest = Manifest::new("1.0.0", InstallType::Full)
            .with_files(vec![record("a.md", "1"), record("b.md", "2"), record("a.md", "3")]);

        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.find("a.md").unwrap().hash.as_deref(), Some("1"));
    }

    #[test]
    fn reads_camel_case_fields_and_ignores_unknown() {
        let yaml = r#"
version: 4.0.0
installedAt: 2024-05-01T10:00:00.000Z
installType: single-agent
agent: dev
idesConfigured: [cursor]
futureField: ignored
files:
  - path: .ai-squad-core/agents/dev.md
    hash: 0123456789abcdef
"#;
        let manifest: Manifest = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(manifest.install_type, InstallType::SingleAgent);
        assert_eq!(manifest.agent.as_deref(), Some("dev"));
        assert!(manifest.ides_configured.contains("cursor"));
        assert!(!manifest.files[0].modified);
    }

    #[test]
    fn writes_snake_case_fields() {
        let manifest = Manifest::new("1.0.0", InstallType::Team);
        let yaml = serde_yaml::to_string(&manifest).unwrap();

        assert!(yaml.contains("install_type: team"));
        assert!(yaml.contains("installed_at:"));
        assert!(yaml.contains("ides_setup:"));
        assert!(!yaml.contains("expansion_pack_id"));
    }
}
