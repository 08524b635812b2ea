//! Well-known names in source stores and install targets.

use std::path::Path;

/// Standard marker directories and file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadPath {
    /// The `.ai-squad-core` directory (managed core install root)
    CoreMarker,
    /// The `bmad-agent` directory left by the predecessor format
    LegacyMarker,
    /// The `install-manifest.yaml` file inside a marker directory
    ManifestFile,
    /// The `config.yaml` file identifying an expansion pack
    PackConfig,
    /// The `ai-squad-core` directory of a source store (primary store)
    PrimaryStore,
    /// The `common` directory of a source store (shared fallback store)
    SharedStore,
    /// The `expansion-packs` directory of a source store
    PacksDir,
    /// The `core-config.yaml` file carrying the available version
    CoreConfig,
}

impl SquadPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreMarker => ".ai-squad-core",
            Self::LegacyMarker => "bmad-agent",
            Self::ManifestFile => "install-manifest.yaml",
            Self::PackConfig => "config.yaml",
            Self::PrimaryStore => "ai-squad-core",
            Self::SharedStore => "common",
            Self::PacksDir => "expansion-packs",
            Self::CoreConfig => "core-config.yaml",
        }
    }
}

/// Marker directory name for an expansion pack (`.<packId>`).
pub fn pack_marker(pack_id: &str) -> String {
    format!(".{pack_id}")
}

impl AsRef<Path> for SquadPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for SquadPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SquadPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
