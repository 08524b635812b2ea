//! Expansion pack installs, decisions and back-filling

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use squad_fs::list_files;

use super::writer::{UnitWriter, WrittenUnit, render_placeholder};
use super::{InstallReport, Outcome, PackAction, PackReport, ReconcileAction, Reconciler};
use crate::Result;
use crate::decision::{ChoiceId, DecisionKind, DecisionRequest, Decider, ask};
use crate::manifest::{
    InstallType, IntegrityReport, Manifest, ManifestStatus, UnitMarker, check_integrity,
};
use crate::request::normalize_target;
use crate::resolver::{
    DependencyResolver, ResolutionCache, ResourceKey, WILDCARD, parse_agent_header, parse_team,
};
use crate::source::{ORCHESTRATOR_ID, PackInfo, StoreOrigin};
use crate::version::compare_versions;

/// Pack folders copied into `.<packId>`.
pub const PACK_FOLDERS: &[&str] = &[
    "agents",
    "agent-teams",
    "templates",
    "tasks",
    "checklists",
    "workflows",
    "data",
    "utils",
    "schemas",
];

/// Files copied from the pack root.
pub const PACK_ROOT_FILES: &[&str] = &["config.yaml", "README.md"];

#[derive(Debug)]
pub(crate) enum PackPlanAction {
    Install,
    Reinstall,
    Repair(IntegrityReport),
    Skip,
}

#[derive(Debug)]
pub(crate) struct PackPlan {
    pack: PackInfo,
    action: PackPlanAction,
}

struct WrittenPack {
    written: WrittenUnit,
    warnings: Vec<String>,
}

impl Reconciler {
    /// Install packs into `target` without touching the core unit.
    pub fn install_expansion_packs(
        &self,
        target: &Path,
        pack_ids: &[String],
        ides: &[String],
        decider: &mut dyn Decider,
    ) -> Result<Outcome> {
        let target = normalize_target(target);
        let Some(plans) = self.plan_packs(&target, pack_ids, decider)? else {
            return Ok(Outcome::Cancelled);
        };

        let mut report = InstallReport::new(ReconcileAction::ExpansionsOnly, &target);
        self.apply_pack_plans(&target, plans, ides, &mut report)?;
        Ok(Outcome::Completed(report))
    }

    /// Decide what to do with each requested pack. `None` means cancelled.
    pub(crate) fn plan_packs(
        &self,
        target: &Path,
        pack_ids: &[String],
        decider: &mut dyn Decider,
    ) -> Result<Option<Vec<PackPlan>>> {
        let mut plans = Vec::new();

        for pack_id in pack_ids {
            let pack = self.source.find_pack(pack_id)?;
            let marker = UnitMarker::Pack(pack_id.clone());

            let action = match self.manifests.read(target, &marker) {
                ManifestStatus::Present(existing) => {
                    match self.decide_existing_pack(target, &pack, &existing, decider)? {
                        Some(action) => action,
                        None => return Ok(None),
                    }
                }
                ManifestStatus::Malformed { diagnostic, .. } => {
                    tracing::warn!(pack = %pack_id, %diagnostic, "Pack manifest unusable, reinstalling");
                    PackPlanAction::Reinstall
                }
                ManifestStatus::Absent => PackPlanAction::Install,
            };
            plans.push(PackPlan { pack, action });
        }

        Ok(Some(plans))
    }

    fn decide_existing_pack(
        &self,
        target: &Path,
        pack: &PackInfo,
        existing: &Manifest,
        decider: &mut dyn Decider,
    ) -> Result<Option<PackPlanAction>> {
        let integrity = check_integrity(target, existing);
        let ordering = compare_versions(&existing.version, &pack.version);

        let mut decision = DecisionRequest::new(
            DecisionKind::ExistingPack {
                pack_id: pack.id.clone(),
            },
            format!(
                "{} v{} is already installed (available v{})",
                pack.name, existing.version, pack.version
            ),
        );
        if !integrity.is_clean() {
            decision = decision.detail(format!(
                "{} missing and {} modified files",
                integrity.missing.len(),
                integrity.modified.len()
            ));
        }

        let decision = match ordering {
            Ordering::Equal => {
                let mut decision = decision;
                let mut default = ChoiceId::Skip;
                if !integrity.is_clean() {
                    decision = decision.choice(ChoiceId::Repair, "Repair (restore missing and modified files)");
                    default = ChoiceId::Repair;
                }
                decision
                    .choice(ChoiceId::Overwrite, "Reinstall (overwrite)")
                    .choice(ChoiceId::Skip, "Skip this pack")
                    .choice(ChoiceId::Cancel, "Cancel")
                    .default_choice(default)
            }
            Ordering::Less => decision
                .choice(ChoiceId::Proceed, format!("Upgrade to v{}", pack.version))
                .choice(ChoiceId::Skip, "Skip this pack")
                .choice(ChoiceId::Cancel, "Cancel")
                .default_choice(ChoiceId::Proceed),
            Ordering::Greater => decision
                .choice(ChoiceId::KeepCurrent, "Keep the installed version")
                .choice(ChoiceId::Downgrade, format!("Downgrade to v{}", pack.version))
                .choice(ChoiceId::Cancel, "Cancel")
                .default_choice(ChoiceId::KeepCurrent),
        };

        Ok(match ask(decider, &decision)? {
            ChoiceId::Repair => Some(PackPlanAction::Repair(integrity)),
            ChoiceId::Overwrite | ChoiceId::Proceed | ChoiceId::Downgrade => {
                Some(PackPlanAction::Reinstall)
            }
            ChoiceId::Skip | ChoiceId::KeepCurrent => Some(PackPlanAction::Skip),
            _ => None,
        })
    }

    pub(crate) fn apply_pack_plans(
        &self,
        target: &Path,
        plans: Vec<PackPlan>,
        ides: &[String],
        report: &mut InstallReport,
    ) -> Result<()> {
        for PackPlan { pack, action } in plans {
            let pack_action = match action {
                PackPlanAction::Skip => {
                    tracing::info!(pack = %pack.id, "Skipping pack");
                    report.packs.push(PackReport {
                        id: pack.id,
                        version: pack.version,
                        action: PackAction::Skipped,
                        files: Vec::new(),
                    });
                    continue;
                }
                PackPlanAction::Repair(integrity) => {
                    let repaired = self.repair_pack(target, &pack.id, &integrity)?;
                    report.packs.push(PackReport {
                        id: pack.id,
                        version: pack.version,
                        action: PackAction::Repaired,
                        files: repaired.restored.clone(),
                    });
                    report.absorb_repair(repaired);
                    continue;
                }
                PackPlanAction::Reinstall => {
                    let dir = target.join(UnitMarker::Pack(pack.id.clone()).dir_name());
                    squad_fs::io::remove_dir_all(&dir)?;
                    PackAction::Reinstalled
                }
                PackPlanAction::Install => PackAction::Installed,
            };

            let WrittenPack { written, warnings } = self.write_pack(target, &pack, ides)?;
            let files = written.paths();
            report.files.extend(files.iter().cloned());
            for warning in warnings {
                report.warn(warning);
            }
            report.packs.push(PackReport {
                id: pack.id,
                version: pack.version,
                action: pack_action,
                files,
            });
        }
        Ok(())
    }

    fn write_pack(&self, target: &Path, pack: &PackInfo, ides: &[String]) -> Result<WrittenPack> {
        let marker = UnitMarker::Pack(pack.id.clone());
        let mut writer = UnitWriter::new(target, &marker);
        let mut warnings = Vec::new();
        tracing::info!(pack = %pack.id, version = %pack.version, "Installing expansion pack");

        for folder in PACK_FOLDERS {
            writer.copy_tree(&pack.path.join(folder), folder, false)?;
        }
        for file in PACK_ROOT_FILES {
            let path = pack.path.join(file);
            if path.is_file() {
                writer.copy(&path, file)?;
            }
        }
        writer.copy_tree(&self.source.shared_dir(), "", true)?;
        self.backfill_pack(pack, &mut writer, &mut warnings)?;

        let written = writer.finish();
        let mut manifest = Manifest::new(pack.version.clone(), InstallType::ExpansionPack)
            .with_files(written.records.clone());
        manifest.expansion_pack_id = Some(pack.id.clone());
        manifest.expansion_pack_name = Some(pack.name.clone());
        manifest.ides_configured = ides.iter().cloned().collect();
        self.manifests.write(target, &marker, &manifest)?;

        Ok(WrittenPack { written, warnings })
    }

    /// Copy core agents named by the pack's teams, then every resource the
    /// pack's agents declare but the pack does not ship.
    fn backfill_pack(
        &self,
        pack: &PackInfo,
        writer: &mut UnitWriter,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let pack_agents = markdown_stems(&pack.path.join("agents"))?;
        let mut agents: Vec<(String, PathBuf)> = pack_agents
            .iter()
            .map(|id| (id.clone(), pack.path.join("agents").join(format!("{id}.md"))))
            .collect();

        let teams_dir = pack.path.join("agent-teams");
        for team_file in list_files(&teams_dir)? {
            if !matches!(team_file.extension(), Some("yaml" | "yml")) {
                continue;
            }
            let team_path = teams_dir.join(team_file.to_native());
            let content = squad_fs::io::read_text(&team_path)?;
            let team = match parse_team(team_file.as_str(), &team_path, &content) {
                Ok(team) => team,
                Err(e) => {
                    warnings.push(format!("Skipping team in pack {}: {e}", pack.id));
                    continue;
                }
            };

            let members = std::iter::once(ORCHESTRATOR_ID.to_string())
                .chain(team.agents.into_iter().filter(|id| id != WILDCARD));
            for agent_id in members {
                let inner = format!("agents/{agent_id}.md");
                if pack_agents.contains(&agent_id) || writer.contains(&inner) {
                    continue;
                }
                let core_path = self.source.agent_path(&agent_id);
                if !core_path.is_file() {
                    warnings.push(format!(
                        "Agent {agent_id} used by pack {} not found in the pack or the core",
                        pack.id
                    ));
                    continue;
                }
                writer.copy(&core_path, &inner)?;
                tracing::debug!(pack = %pack.id, agent = %agent_id, "Back-filled core agent");
                agents.push((agent_id, core_path));
            }
        }

        let resolver = DependencyResolver::new(&self.source);
        let mut cache = ResolutionCache::new();
        for (agent_id, path) in agents {
            let content = squad_fs::io::read_text(&path)?;
            let header = match parse_agent_header(&agent_id, &path, &content) {
                Ok(header) => header,
                Err(e) => {
                    warnings.push(format!("Skipping dependencies of {agent_id}: {e}"));
                    continue;
                }
            };

            for (kind, id) in header.dependencies.iter() {
                let key = ResourceKey::new(kind, id);
                let inner = key.install_relative();
                if writer.contains(&inner) {
                    continue;
                }
                match resolver.load_resource(&key, &mut cache)? {
                    Some(resource) => {
                        let content = match resource.origin {
                            StoreOrigin::Primary => resource.content.clone(),
                            StoreOrigin::Shared => {
                                render_placeholder(&resource.content, writer.marker())
                            }
                        };
                        writer.write(&inner, content.as_bytes())?;
                        tracing::debug!(pack = %pack.id, resource = %key, "Back-filled resource");
                    }
                    None => warnings.push(format!(
                        "{kind} '{id}' needed by {agent_id} in pack {} not found",
                        pack.id
                    )),
                }
            }
        }

        Ok(())
    }
}

/// Top-level markdown files in `dir`, sorted.
fn markdown_stems(dir: &Path) -> Result<BTreeSet<String>> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|file| file.extension() == Some("md") && !file.as_str().contains('/'))
        .filter_map(|file| file.as_str().strip_suffix(".md").map(str::to_string))
        .collect())
}
