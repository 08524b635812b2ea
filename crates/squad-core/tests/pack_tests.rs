//! Expansion pack installs, back-filling and pack decisions

use pretty_assertions::assert_eq;
use squad_core::{
    ChoiceId, DecisionKind, DefaultDecider, Error, InstallRequest, InstallType, Manifest,
    ManifestRepository, PackAction, Reconciler, ScriptedDecider, SourceStore, UnitMarker,
};
use squad_test_utils::{TestSource, TestTarget};

fn reconciler(source: &TestSource) -> Reconciler {
    Reconciler::new(SourceStore::new(source.root()))
}

fn pack_manifest(target: &TestTarget, pack: &str) -> Manifest {
    ManifestRepository::new()
        .read(target.root(), &UnitMarker::Pack(pack.to_string()))
        .into_manifest()
        .expect("pack manifest")
}

fn infra() -> Vec<String> {
    vec!["infra".to_string()]
}

#[test]
fn full_install_with_pack_writes_both_manifests() {
    let source = TestSource::standard();
    let target = TestTarget::new();

    let outcome = reconciler(&source)
        .install(
            &InstallRequest::full(target.root()).with_expansion_packs(["infra"]),
            &mut DefaultDecider,
        )
        .unwrap();

    let report = outcome.report().unwrap();
    assert_eq!(report.packs.len(), 1);
    assert_eq!(report.packs[0].action, PackAction::Installed);

    let manifest = pack_manifest(&target, "infra");
    assert_eq!(manifest.install_type, InstallType::ExpansionPack);
    assert_eq!(manifest.expansion_pack_id.as_deref(), Some("infra"));
    assert_eq!(manifest.expansion_pack_name.as_deref(), Some("Infrastructure Pack"));
    assert!(manifest.paths().all(|p| p.starts_with(".infra/")));

    let core = ManifestRepository::new()
        .read(target.root(), &UnitMarker::Core)
        .into_manifest()
        .unwrap();
    assert_eq!(core.expansion_packs, infra());
}

#[test]
fn pack_ships_its_own_folders_and_root_files() {
    let source = TestSource::standard();
    let target = TestTarget::new();

    reconciler(&source)
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    target.assert_file_exists(".infra/agents/infra-architect.md");
    target.assert_file_exists(".infra/tasks/infra-review.md");
    target.assert_file_exists(".infra/templates/infra-tmpl.yaml");
    target.assert_file_exists(".infra/config.yaml");
    target.assert_file_exists(".infra/README.md");
    target.assert_file_not_exists(".ai-squad-core");
}

#[test]
fn shared_files_render_with_pack_marker() {
    let source = TestSource::standard();
    let target = TestTarget::new();

    reconciler(&source)
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    target.assert_file_contains(
        ".infra/utils/workflow-management.md",
        "Workflows are in .infra/workflows",
    );
}

#[test]
fn core_agents_and_resources_are_back_filled() {
    let source = TestSource::standard();
    let target = TestTarget::new();

    reconciler(&source)
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    // named by the pack's team
    target.assert_file_exists(".infra/agents/dev.md");
    target.assert_file_exists(".infra/agents/ai-squad-orchestrator.md");
    // declared by back-filled agents
    target.assert_file_exists(".infra/tasks/implement-story.md");
    target.assert_file_exists(".infra/checklists/story-dod-checklist.md");
    target.assert_file_exists(".infra/data/kb.md");
    target.assert_file_not_exists(".infra/agents/qa.md");

    let manifest = pack_manifest(&target, "infra");
    assert!(manifest.find(".infra/tasks/implement-story.md").is_some());
}

#[test]
fn expansion_only_request_installs_no_core() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let request = InstallRequest::new(InstallType::ExpansionOnly, target.root())
        .with_expansion_packs(["infra"]);

    reconciler(&source).install(&request, &mut DefaultDecider).unwrap();

    target.assert_file_exists(".infra/install-manifest.yaml");
    target.assert_file_not_exists(".ai-squad-core");
}

#[test]
fn unknown_pack_fails_before_writing() {
    let source = TestSource::standard();
    let target = TestTarget::new();

    let err = reconciler(&source)
        .install(
            &InstallRequest::full(target.root()).with_expansion_packs(["nope"]),
            &mut DefaultDecider,
        )
        .unwrap_err();

    assert!(matches!(err, Error::PackNotFound(id) if id == "nope"));
    target.assert_file_not_exists(".ai-squad-core");
}

#[test]
fn installed_pack_same_version_can_be_skipped() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    let mut decider = ScriptedDecider::new([ChoiceId::Skip]);
    let outcome = reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut decider)
        .unwrap();

    assert_eq!(outcome.report().unwrap().packs[0].action, PackAction::Skipped);
    let request = &decider.seen()[0];
    assert_eq!(
        request.kind,
        DecisionKind::ExistingPack {
            pack_id: "infra".into()
        }
    );
    assert!(!request.offers(ChoiceId::Repair));
}

#[test]
fn damaged_pack_is_repaired_in_place() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();
    target.remove(".infra/tasks/infra-review.md");
    target.write(".infra/agents/dev.md", "edited");

    let outcome = reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    let pack = &outcome.report().unwrap().packs[0];
    assert_eq!(pack.action, PackAction::Repaired);
    target.assert_file_exists(".infra/tasks/infra-review.md");
    assert_eq!(target.read(".infra/agents/dev.md.bak"), "edited");
    assert_eq!(
        target.read(".infra/agents/dev.md"),
        std::fs::read_to_string(source.primary_path("agents/dev.md")).unwrap()
    );
}

#[test]
fn newer_pack_version_reinstalls_on_request() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();
    target.write(".infra/notes.md", "stray");
    source.pack("infra", "Infrastructure Pack", "1.1.0");

    let mut decider = ScriptedDecider::new([ChoiceId::Proceed]);
    let outcome = reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut decider)
        .unwrap();

    assert_eq!(outcome.report().unwrap().packs[0].action, PackAction::Reinstalled);
    target.assert_file_not_exists(".infra/notes.md");
    assert_eq!(pack_manifest(&target, "infra").version, "1.1.0");
}

#[test]
fn older_available_pack_defaults_to_keeping_current() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    source.pack("infra", "Infrastructure Pack", "2.0.0");
    reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();
    source.pack("infra", "Infrastructure Pack", "1.0.0");

    let outcome = reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    assert_eq!(outcome.report().unwrap().packs[0].action, PackAction::Skipped);
    assert_eq!(pack_manifest(&target, "infra").version, "2.0.0");
}

#[test]
fn pack_cancel_happens_before_core_is_written() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install_expansion_packs(target.root(), &infra(), &[], &mut DefaultDecider)
        .unwrap();

    let outcome = reconciler
        .fresh_install(
            &InstallRequest::full(target.root()).with_expansion_packs(["infra"]),
            &mut ScriptedDecider::new([ChoiceId::Cancel]),
        )
        .unwrap();

    assert!(outcome.is_cancelled());
    target.assert_file_not_exists(".ai-squad-core");
}

#[test]
fn repair_covers_damaged_packs() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install(
            &InstallRequest::full(target.root()).with_expansion_packs(["infra"]),
            &mut DefaultDecider,
        )
        .unwrap();
    target.remove(".infra/README.md");

    let report = reconciler.repair(target.root()).unwrap();

    assert!(report.restored.contains(&".infra/README.md".to_string()));
    assert_eq!(report.packs[0].action, PackAction::Repaired);
    target.assert_file_exists(".infra/README.md");
}

#[test]
fn status_lists_installed_packs() {
    let source = TestSource::standard();
    let target = TestTarget::new();
    let reconciler = reconciler(&source);
    reconciler
        .install(
            &InstallRequest::full(target.root()).with_expansion_packs(["infra"]),
            &mut DefaultDecider,
        )
        .unwrap();

    let status = reconciler.status(target.root());

    assert_eq!(status.version.as_deref(), Some("1.0.0"));
    assert_eq!(status.packs.len(), 1);
    assert_eq!(status.packs[0].id, "infra");
    assert!(status.is_healthy());

    target.remove(".infra/README.md");
    assert!(!reconciler.status(target.root()).is_healthy());
}
