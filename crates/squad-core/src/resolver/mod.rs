//! Transitive dependency resolution for agents and teams
//!
//! An agent declares its resources in a yaml header; a team composes
//! agents and ships workflows. Resources are looked up in the primary store
//! first and the shared store second. A resource found in neither is
//! recorded as a warning and the unit still resolves.

mod cache;
mod definition;

pub use cache::ResolutionCache;
pub use definition::{
    AgentHeader, AgentIdentity, DependencyLists, TeamDefinition, parse_agent_header, parse_team,
};

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::source::{
    MASTER_ID, ORCHESTRATOR_ID, ResourceKind, SourceStore, StoreOrigin, resource_file_name,
};
use crate::{Error, Result};

/// Token in a team's agent list meaning every available agent.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Agent,
    Team,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Agent => write!(f, "agent"),
            UnitKind::Team => write!(f, "team"),
        }
    }
}

/// An installable unit by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitRef {
    pub kind: UnitKind,
    pub id: String,
}

impl UnitRef {
    pub fn agent(id: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Agent,
            id: id.into(),
        }
    }

    pub fn team(id: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Team,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for UnitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

/// Resource identity: two units declaring the same key share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceKey {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Location inside a marker directory, e.g. `tasks/create-doc.md`.
    pub fn install_relative(&self) -> String {
        format!("{}/{}", self.kind.dir_name(), resource_file_name(&self.id))
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResource {
    pub key: ResourceKey,
    pub path: PathBuf,
    pub origin: StoreOrigin,
    #[serde(skip)]
    pub content: String,
}

/// A loaded agent or team file.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub id: String,
    pub kind: UnitKind,
    pub path: PathBuf,
    pub content: String,
    pub dependencies: Vec<ResourceKey>,
}

impl UnitDefinition {
    /// Location inside a marker directory.
    pub fn install_relative(&self) -> String {
        match self.kind {
            UnitKind::Agent => format!("agents/{}.md", self.id),
            UnitKind::Team => format!("agent-teams/{}.yaml", self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    MissingResource { key: ResourceKey, required_by: String },
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::MissingResource { key, required_by } => write!(
                f,
                "{} '{}' required by {} not found in primary or shared store",
                key.kind, key.id, required_by
            ),
        }
    }
}

/// The closed set of files one unit needs.
#[derive(Debug, Clone)]
pub struct ResolvedDependencySet {
    pub unit: UnitRef,
    /// The root unit's own file.
    pub definition: Arc<UnitDefinition>,
    /// Agents composed by the unit; for an agent request, the agent itself.
    pub members: Vec<Arc<UnitDefinition>>,
    pub resources: BTreeMap<ResourceKey, Arc<ResolvedResource>>,
    pub warnings: Vec<ResolveWarning>,
}

impl ResolvedDependencySet {
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.id.as_str()).collect()
    }

    fn add_warning(&mut self, warning: ResolveWarning) {
        let duplicate = self.warnings.iter().any(|existing| match (existing, &warning) {
            (
                ResolveWarning::MissingResource { key: a, .. },
                ResolveWarning::MissingResource { key: b, .. },
            ) => a == b,
        });
        if !duplicate {
            tracing::warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    fn dedup_by_path(&mut self) {
        let mut seen = HashSet::new();
        self.resources
            .retain(|_, resource| seen.insert(resource.path.clone()));
    }
}

/// Resolves units against a [`SourceStore`].
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    store: &'a SourceStore,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(store: &'a SourceStore) -> Self {
        Self { store }
    }

    /// Resolve one unit with a fresh cache.
    pub fn resolve(&self, unit: &UnitRef) -> Result<ResolvedDependencySet> {
        let mut cache = ResolutionCache::new();
        self.resolve_with_cache(unit, &mut cache)
    }

    /// Resolve several units sharing one cache.
    ///
    /// A failing unit does not stop its siblings; each unit gets its own
    /// result.
    pub fn resolve_many(&self, units: &[UnitRef]) -> Vec<(UnitRef, Result<ResolvedDependencySet>)> {
        let mut cache = ResolutionCache::new();
        units
            .iter()
            .map(|unit| (unit.clone(), self.resolve_with_cache(unit, &mut cache)))
            .collect()
    }

    pub fn resolve_with_cache(
        &self,
        unit: &UnitRef,
        cache: &mut ResolutionCache,
    ) -> Result<ResolvedDependencySet> {
        tracing::debug!(%unit, "Resolving unit");
        match unit.kind {
            UnitKind::Agent => self.resolve_agent(unit, cache),
            UnitKind::Team => self.resolve_team(unit, cache),
        }
    }

    fn resolve_agent(
        &self,
        unit: &UnitRef,
        cache: &mut ResolutionCache,
    ) -> Result<ResolvedDependencySet> {
        let agent = self.load_agent(&unit.id, cache)?;
        let mut set = ResolvedDependencySet {
            unit: unit.clone(),
            definition: Arc::clone(&agent),
            members: vec![Arc::clone(&agent)],
            resources: BTreeMap::new(),
            warnings: Vec::new(),
        };
        self.collect_resources(&agent, cache, &mut set)?;
        set.dedup_by_path();
        Ok(set)
    }

    fn resolve_team(
        &self,
        unit: &UnitRef,
        cache: &mut ResolutionCache,
    ) -> Result<ResolvedDependencySet> {
        let path = self.store.team_path(&unit.id);
        let content = read_unit(&path, unit)?;
        cache.record_read();
        let team = parse_team(&unit.id, &path, &content)?;

        let definition = Arc::new(UnitDefinition {
            id: unit.id.clone(),
            kind: UnitKind::Team,
            path,
            content,
            dependencies: team
                .workflows
                .iter()
                .map(|id| ResourceKey::new(ResourceKind::Workflows, id.as_str()))
                .collect(),
        });

        let mut set = ResolvedDependencySet {
            unit: unit.clone(),
            definition: Arc::clone(&definition),
            members: Vec::new(),
            resources: BTreeMap::new(),
            warnings: Vec::new(),
        };

        for id in self.team_member_ids(&team)? {
            let agent = self.load_agent(&id, cache)?;
            self.collect_resources(&agent, cache, &mut set)?;
            set.members.push(agent);
        }
        self.collect_resources(&definition, cache, &mut set)?;

        set.dedup_by_path();
        Ok(set)
    }

    /// The orchestrator first, then listed agents with the wildcard expanded.
    fn team_member_ids(&self, team: &TeamDefinition) -> Result<Vec<String>> {
        let mut ids = vec![ORCHESTRATOR_ID.to_string()];
        let mut add = |id: &str| {
            if id != MASTER_ID && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        };

        for id in &team.agents {
            if id == WILDCARD {
                for agent in self.store.list_agents()? {
                    add(&agent);
                }
            } else {
                add(id);
            }
        }
        Ok(ids)
    }

    fn load_agent(&self, id: &str, cache: &mut ResolutionCache) -> Result<Arc<UnitDefinition>> {
        if let Some(agent) = cache.agent(id) {
            return Ok(agent);
        }

        let path = self.store.agent_path(id);
        let content = read_unit(&path, &UnitRef::agent(id))?;
        cache.record_read();
        let header = parse_agent_header(id, &path, &content)?;

        let agent = Arc::new(UnitDefinition {
            id: id.to_string(),
            kind: UnitKind::Agent,
            path,
            content,
            dependencies: header
                .dependencies
                .iter()
                .map(|(kind, id)| ResourceKey::new(kind, id))
                .collect(),
        });
        cache.store_agent(Arc::clone(&agent));
        Ok(agent)
    }

    fn collect_resources(
        &self,
        unit: &UnitDefinition,
        cache: &mut ResolutionCache,
        set: &mut ResolvedDependencySet,
    ) -> Result<()> {
        for key in &unit.dependencies {
            match self.load_resource(key, cache)? {
                Some(resource) => {
                    set.resources.entry(key.clone()).or_insert(resource);
                }
                None => set.add_warning(ResolveWarning::MissingResource {
                    key: key.clone(),
                    required_by: unit.id.clone(),
                }),
            }
        }
        Ok(())
    }

    /// Primary store first, then shared; the first hit wins.
    pub fn load_resource(
        &self,
        key: &ResourceKey,
        cache: &mut ResolutionCache,
    ) -> Result<Option<Arc<ResolvedResource>>> {
        if let Some(cached) = cache.resource(key) {
            return Ok(cached.clone());
        }

        let mut found = None;
        for origin in [StoreOrigin::Primary, StoreOrigin::Shared] {
            let path = self.store.resource_path(origin, key.kind, &key.id);
            if !path.is_file() {
                continue;
            }
            let content = squad_fs::io::read_text(&path)?;
            cache.record_read();
            found = Some(Arc::new(ResolvedResource {
                key: key.clone(),
                path,
                origin,
                content,
            }));
            break;
        }

        cache.store_resource(key.clone(), found.clone());
        Ok(found)
    }
}

fn read_unit(path: &std::path::Path, unit: &UnitRef) -> Result<String> {
    match squad_fs::io::read_text(path) {
        Ok(content) => Ok(content),
        Err(e) if e.is_not_found() => Err(Error::UnitNotFound {
            kind: unit.kind.to_string(),
            id: unit.id.clone(),
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}
