//! Install requests, validated once at the boundary

use std::path::{Path, PathBuf};

use squad_fs::SquadPath;

use crate::manifest::InstallType;
use crate::{Error, Result};

/// What the caller asked to install, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallRequest {
    pub install_type: InstallType,
    pub agent: Option<String>,
    pub team: Option<String>,
    pub target_directory: PathBuf,
    /// Passed through to locale collaborators; the core does not translate.
    pub language: Option<String>,
    pub ides: Vec<String>,
    pub expansion_packs: Vec<String>,
}

impl InstallRequest {
    pub fn new(install_type: InstallType, target_directory: impl Into<PathBuf>) -> Self {
        Self {
            install_type,
            agent: None,
            team: None,
            target_directory: target_directory.into(),
            language: None,
            ides: Vec::new(),
            expansion_packs: Vec::new(),
        }
    }

    pub fn full(target_directory: impl Into<PathBuf>) -> Self {
        Self::new(InstallType::Full, target_directory)
    }

    pub fn single_agent(target_directory: impl Into<PathBuf>, agent: impl Into<String>) -> Self {
        Self::new(InstallType::SingleAgent, target_directory).with_agent(agent)
    }

    pub fn team(target_directory: impl Into<PathBuf>, team: impl Into<String>) -> Self {
        Self::new(InstallType::Team, target_directory).with_team(team)
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_ides(mut self, ides: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ides = ides.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expansion_packs(mut self, packs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.expansion_packs = packs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check the fields each install type depends on.
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &Option<String>| field.as_deref().is_none_or(|s| s.trim().is_empty());

        match self.install_type {
            InstallType::SingleAgent if missing(&self.agent) => Err(Error::InvalidRequest(
                "single-agent install requires an agent id".to_string(),
            )),
            InstallType::Team if missing(&self.team) => Err(Error::InvalidRequest(
                "team install requires a team id".to_string(),
            )),
            InstallType::ExpansionPack => Err(Error::InvalidRequest(
                "expansion-pack is a manifest type; request expansion-only instead".to_string(),
            )),
            InstallType::ExpansionOnly if self.expansion_packs.is_empty() => Err(
                Error::InvalidRequest("expansion-only install requires at least one pack".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// The directory installs land in.
    ///
    /// Pointing at the core marker directory itself means its parent.
    pub fn target_root(&self) -> PathBuf {
        normalize_target(&self.target_directory)
    }

    /// Whether this request installs the core unit at all.
    pub fn installs_core(&self) -> bool {
        self.install_type != InstallType::ExpansionOnly
    }
}

pub fn normalize_target(path: &Path) -> PathBuf {
    let is_marker = path
        .file_name()
        .is_some_and(|name| name == SquadPath::CoreMarker.as_str());
    match path.parent() {
        Some(parent) if is_marker => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}
