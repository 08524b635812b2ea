//! Dependency resolution against a fixture source store

use pretty_assertions::assert_eq;
use squad_core::{
    DependencyResolver, Error, ResolutionCache, ResolveWarning, ResourceKey, ResourceKind,
    SourceStore, StoreOrigin, UnitRef,
};
use squad_test_utils::TestSource;

fn keys(ids: &[(ResourceKind, &str)]) -> Vec<ResourceKey> {
    ids.iter().map(|(kind, id)| ResourceKey::new(*kind, *id)).collect()
}

#[test]
fn agent_resolves_declared_resources() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("dev"))
        .unwrap();

    assert_eq!(set.member_ids(), vec!["dev"]);
    assert_eq!(
        set.resources.keys().cloned().collect::<Vec<_>>(),
        keys(&[
            (ResourceKind::Tasks, "execute-checklist"),
            (ResourceKind::Tasks, "implement-story"),
            (ResourceKind::Checklists, "story-dod-checklist"),
        ])
    );
    assert!(set.warnings.is_empty());
}

#[test]
fn shared_resource_is_resolved_once_for_a_team() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::team("team-dev"))
        .unwrap();

    let shared: Vec<_> = set
        .resources
        .keys()
        .filter(|key| key.id == "execute-checklist")
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(set.resources.len(), 6);
}

#[test]
fn team_always_starts_with_orchestrator() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::team("team-dev"))
        .unwrap();

    assert_eq!(set.member_ids(), vec!["ai-squad-orchestrator", "dev", "qa"]);
    assert!(set
        .resources
        .contains_key(&ResourceKey::new(ResourceKind::Workflows, "greenfield.yaml")));
}

#[test]
fn wildcard_expands_to_every_agent_but_master() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::team("team-all"))
        .unwrap();

    assert_eq!(
        set.member_ids(),
        vec!["ai-squad-orchestrator", "dev", "pm", "qa"]
    );
}

#[test]
fn resource_falls_back_to_shared_store() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("pm"))
        .unwrap();

    let preferences = &set.resources[&ResourceKey::new(ResourceKind::Data, "technical-preferences")];
    assert_eq!(preferences.origin, StoreOrigin::Shared);
    assert!(preferences.content.contains("{root}"));
}

#[test]
fn primary_store_wins_over_shared() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("qa"))
        .unwrap();

    let task = &set.resources[&ResourceKey::new(ResourceKind::Tasks, "execute-checklist")];
    assert_eq!(task.origin, StoreOrigin::Primary);
    assert_eq!(task.content, "# Execute checklist\n");
}

#[test]
fn resource_missing_everywhere_is_a_warning() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("pm"))
        .unwrap();

    assert_eq!(
        set.warnings,
        vec![ResolveWarning::MissingResource {
            key: ResourceKey::new(ResourceKind::Utils, "missing-util"),
            required_by: "pm".to_string(),
        }]
    );
    assert_eq!(set.resources.len(), 2);
}

#[test]
fn missing_workflow_in_team_is_a_warning() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::team("team-all"))
        .unwrap();

    let missing: Vec<String> = set.warnings.iter().map(ToString::to_string).collect();
    assert_eq!(missing.len(), 2);
    assert!(missing.iter().any(|w| w.contains("brownfield.yaml")));
    assert!(missing.iter().any(|w| w.contains("missing-util")));
}

#[test]
fn unknown_agent_is_not_found() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());

    let err = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("nobody"))
        .unwrap_err();
    assert!(matches!(err, Error::UnitNotFound { .. }));
}

#[test]
fn agent_without_header_is_malformed() {
    let source = TestSource::standard();
    source.primary_file("agents/plain.md", "# Plain\n\nNo header here.\n");
    let store = SourceStore::new(source.root());

    let err = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("plain"))
        .unwrap_err();
    assert!(matches!(err, Error::UnitDefinitionMalformed { .. }));
}

#[test]
fn malformed_team_does_not_abort_batch() {
    let source = TestSource::standard();
    source.primary_file("agent-teams/broken.yaml", "agents: [unclosed");
    let store = SourceStore::new(source.root());

    let results = DependencyResolver::new(&store).resolve_many(&[
        UnitRef::team("broken"),
        UnitRef::agent("dev"),
        UnitRef::team("team-dev"),
    ]);

    assert!(matches!(results[0].1, Err(Error::UnitDefinitionMalformed { .. })));
    assert!(results[1].1.is_ok());
    assert!(results[2].1.is_ok());
}

#[test]
fn cache_reads_each_file_once() {
    let source = TestSource::standard();
    let store = SourceStore::new(source.root());
    let resolver = DependencyResolver::new(&store);
    let mut cache = ResolutionCache::new();

    resolver
        .resolve_with_cache(&UnitRef::agent("dev"), &mut cache)
        .unwrap();
    assert_eq!(cache.disk_reads(), 4);

    // qa adds itself and review-story; execute-checklist is cached
    resolver
        .resolve_with_cache(&UnitRef::agent("qa"), &mut cache)
        .unwrap();
    assert_eq!(cache.disk_reads(), 6);

    resolver
        .resolve_with_cache(&UnitRef::agent("dev"), &mut cache)
        .unwrap();
    assert_eq!(cache.disk_reads(), 6);
}

#[test]
fn ids_that_map_to_one_path_are_deduplicated() {
    let source = TestSource::standard();
    source.agent(
        "twin",
        &[("tasks", "implement-story"), ("tasks", "implement-story.md")],
    );
    let store = SourceStore::new(source.root());

    let set = DependencyResolver::new(&store)
        .resolve(&UnitRef::agent("twin"))
        .unwrap();

    assert_eq!(set.resources.len(), 1);
}
