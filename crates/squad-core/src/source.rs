//! Read-only view of the content shipped with the installer
//!
//! The source root holds three stores:
//!
//! ```text
//! <source>/
//!   ai-squad-core/      primary store (agents, agent-teams, tasks, ...)
//!   common/             shared fallback store, rendered on copy
//!   expansion-packs/    one directory per pack, each with config.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use squad_fs::{ConfigStore, SquadPath};

use crate::{Error, Result};

/// The coordinator every team is resolved with.
pub const ORCHESTRATOR_ID: &str = "ai-squad-orchestrator";

/// The meta agent that is never part of a team.
pub const MASTER_ID: &str = "ai-squad-master";

/// Reported when a store carries no readable version.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Resource categories an agent or team can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tasks,
    Templates,
    Checklists,
    Data,
    Utils,
    Workflows,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Tasks,
        ResourceKind::Templates,
        ResourceKind::Checklists,
        ResourceKind::Data,
        ResourceKind::Utils,
        ResourceKind::Workflows,
    ];

    /// Subdirectory holding resources of this kind in every store.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceKind::Tasks => "tasks",
            ResourceKind::Templates => "templates",
            ResourceKind::Checklists => "checklists",
            ResourceKind::Data => "data",
            ResourceKind::Utils => "utils",
            ResourceKind::Workflows => "workflows",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Which store a resolved file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOrigin {
    Primary,
    Shared,
}

/// File name for a declared resource id; bare ids are markdown.
pub fn resource_file_name(id: &str) -> String {
    if Path::new(id).extension().is_some() {
        id.to_string()
    } else {
        format!("{id}.md")
    }
}

#[derive(Debug, Default, Deserialize)]
struct CoreConfig {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PackConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

/// An expansion pack available in the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub author: Option<String>,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Locates agents, teams, resources and packs under a source root.
#[derive(Debug, Clone)]
pub struct SourceStore {
    root: PathBuf,
    config: ConfigStore,
}

impl SourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: ConfigStore::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn primary_dir(&self) -> PathBuf {
        self.root.join(SquadPath::PrimaryStore)
    }

    pub fn shared_dir(&self) -> PathBuf {
        self.root.join(SquadPath::SharedStore)
    }

    pub fn packs_dir(&self) -> PathBuf {
        self.root.join(SquadPath::PacksDir)
    }

    pub fn pack_dir(&self, pack_id: &str) -> PathBuf {
        self.packs_dir().join(pack_id)
    }

    pub fn agent_path(&self, agent_id: &str) -> PathBuf {
        self.primary_dir().join("agents").join(format!("{agent_id}.md"))
    }

    pub fn team_path(&self, team_id: &str) -> PathBuf {
        self.primary_dir()
            .join("agent-teams")
            .join(format!("{team_id}.yaml"))
    }

    /// Where a resource would live in the given store.
    pub fn resource_path(&self, origin: StoreOrigin, kind: ResourceKind, id: &str) -> PathBuf {
        let store = match origin {
            StoreOrigin::Primary => self.primary_dir(),
            StoreOrigin::Shared => self.shared_dir(),
        };
        store.join(kind.dir_name()).join(resource_file_name(id))
    }

    /// Version of the primary store, read from its `core-config.yaml`.
    pub fn core_version(&self) -> String {
        let path = self.primary_dir().join(SquadPath::CoreConfig);
        match self.config.load::<CoreConfig>(&path) {
            Ok(CoreConfig {
                version: Some(version),
            }) => version,
            Ok(_) => UNKNOWN_VERSION.to_string(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read core version");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    /// Agent ids shipped in the primary store, sorted.
    pub fn list_agents(&self) -> Result<Vec<String>> {
        list_stems(&self.primary_dir().join("agents"), "md")
    }

    /// Team ids shipped in the primary store, sorted.
    pub fn list_teams(&self) -> Result<Vec<String>> {
        list_stems(&self.primary_dir().join("agent-teams"), "yaml")
    }

    /// Every expansion pack directory, sorted by id.
    ///
    /// A pack with a missing or unreadable `config.yaml` is still listed
    /// with its id as name and an unknown version.
    pub fn list_packs(&self) -> Result<Vec<PackInfo>> {
        let dir = self.packs_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&dir, e)),
        };

        let mut packs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&dir, e))?;
            if entry.path().is_dir() {
                let id = entry.file_name().to_string_lossy().to_string();
                packs.push(self.load_pack(&id));
            }
        }
        packs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(packs)
    }

    /// Look up one pack by id.
    pub fn find_pack(&self, pack_id: &str) -> Result<PackInfo> {
        if !self.pack_dir(pack_id).is_dir() {
            return Err(Error::PackNotFound(pack_id.to_string()));
        }
        Ok(self.load_pack(pack_id))
    }

    fn load_pack(&self, pack_id: &str) -> PackInfo {
        let path = self.pack_dir(pack_id);
        let config_path = path.join(SquadPath::PackConfig);
        let config = match self.config.load::<PackConfig>(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(pack = pack_id, error = %e, "Could not read pack config");
                PackConfig::default()
            }
        };

        PackInfo {
            id: pack_id.to_string(),
            name: config.name.unwrap_or_else(|| pack_id.to_string()),
            version: config.version.unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            description: config.description,
            author: config.author,
            path,
        }
    }
}

fn list_stems(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut stems = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            if let Some(stem) = path.file_stem() {
                stems.push(stem.to_string_lossy().to_string());
            }
        }
    }
    stems.sort();
    Ok(stems)
}
