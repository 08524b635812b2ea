//! Memoization scoped to a single resolution call tree

use std::collections::HashMap;
use std::sync::Arc;

use super::{ResolvedResource, ResourceKey, UnitDefinition};

/// Loaded agents and resources for one resolution.
///
/// A miss is cached too, so a resource absent from both stores is probed
/// once no matter how many members declare it.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    resources: HashMap<ResourceKey, Option<Arc<ResolvedResource>>>,
    agents: HashMap<String, Arc<UnitDefinition>>,
    disk_reads: usize,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn resource(&self, key: &ResourceKey) -> Option<&Option<Arc<ResolvedResource>>> {
        self.resources.get(key)
    }

    pub(crate) fn store_resource(&mut self, key: ResourceKey, value: Option<Arc<ResolvedResource>>) {
        self.resources.insert(key, value);
    }

    pub(crate) fn agent(&self, id: &str) -> Option<Arc<UnitDefinition>> {
        self.agents.get(id).cloned()
    }

    pub(crate) fn store_agent(&mut self, definition: Arc<UnitDefinition>) {
        self.agents.insert(definition.id.clone(), definition);
    }

    pub(crate) fn record_read(&mut self) {
        self.disk_reads += 1;
    }

    /// Number of files read from the source store so far.
    pub fn disk_reads(&self) -> usize {
        self.disk_reads
    }
}
