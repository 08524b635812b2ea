//! Top-level install flow and fresh installs of the core unit

use std::cmp::Ordering;
use std::collections::HashSet;

use squad_fs::SquadPath;

use super::legacy::cleanup_legacy_yml;
use super::writer::{UnitWriter, WrittenUnit, render_placeholder};
use super::{InstallReport, Outcome, ReconcileAction, Reconciler};
use crate::decision::{ChoiceId, DecisionKind, DecisionRequest, Decider, ask};
use crate::manifest::{InstallType, Manifest, UnitMarker, check_integrity};
use crate::request::InstallRequest;
use crate::resolver::{DependencyResolver, ResolvedDependencySet, UnitRef};
use crate::source::StoreOrigin;
use crate::state::InstallationKind;
use crate::version::compare_versions;
use crate::{Error, Result};

/// The core unit as written by one fresh install.
pub(crate) struct CoreInstall {
    pub manifest: Manifest,
    pub written: WrittenUnit,
    pub warnings: Vec<String>,
}

impl InstallReport {
    pub(crate) fn absorb_core(&mut self, core: CoreInstall) {
        self.version = Some(core.manifest.version.clone());
        self.files.extend(core.written.paths());
        self.preserved.extend(core.written.preserved);
        for warning in core.warnings {
            self.warn(warning);
        }
    }
}

impl Reconciler {
    /// Classify the target and run whichever operation the state calls for.
    pub fn install(&self, request: &InstallRequest, decider: &mut dyn Decider) -> Result<Outcome> {
        request.validate()?;
        let target = request.target_root();
        tracing::info!(
            target = %target.display(),
            install_type = %request.install_type,
            "Starting install"
        );

        if !target.exists() {
            let decision = DecisionRequest::new(
                DecisionKind::MissingDirectory,
                format!("Directory {} does not exist", target.display()),
            )
            .choice(ChoiceId::CreateDirectory, "Create the directory")
            .choice(ChoiceId::Cancel, "Cancel")
            .default_choice(ChoiceId::CreateDirectory);

            if ask(decider, &decision)? != ChoiceId::CreateDirectory {
                return Ok(Outcome::Cancelled);
            }
            squad_fs::io::ensure_dir(&target)?;
        }

        let state = self.classify(&target);
        for diagnostic in &state.diagnostics {
            tracing::warn!("{diagnostic}");
        }

        match state.kind {
            InstallationKind::Clean => {
                if state.non_empty {
                    tracing::info!(target = %target.display(), "Installing into a non-empty directory");
                }
                self.fresh_install(request, decider)
            }
            InstallationKind::ExistingManaged => {
                let manifest = state.manifest.ok_or_else(|| Error::NoManagedInstall {
                    path: target.clone(),
                })?;
                self.install_over_existing(request, manifest, decider)
            }
            InstallationKind::ExistingLegacy => {
                let decision = DecisionRequest::new(
                    DecisionKind::LegacyInstall,
                    format!("A legacy installation ({}) was found", SquadPath::LegacyMarker),
                )
                .choice(ChoiceId::InstallAlongside, "Install alongside the legacy files")
                .choice(ChoiceId::Cancel, "Cancel")
                .default_choice(ChoiceId::InstallAlongside);

                match ask(decider, &decision)? {
                    ChoiceId::InstallAlongside => self.fresh_install(request, decider),
                    _ => Ok(Outcome::Cancelled),
                }
            }
            InstallationKind::ExistingUnmanaged => {
                let mut decision = DecisionRequest::new(
                    DecisionKind::UnmanagedInstall,
                    format!("{} exists but has no usable manifest", SquadPath::CoreMarker),
                );
                for diagnostic in &state.diagnostics {
                    decision = decision.detail(diagnostic.clone());
                }
                let decision = decision
                    .choice(ChoiceId::InstallAnyway, "Install anyway (files may be overwritten)")
                    .choice(ChoiceId::Cancel, "Cancel")
                    .default_choice(ChoiceId::Cancel);

                match ask(decider, &decision)? {
                    ChoiceId::InstallAnyway => self.fresh_install(request, decider),
                    _ => Ok(Outcome::Cancelled),
                }
            }
        }
    }

    /// Offer upgrade, repair, reinstall or downgrade for a managed install.
    ///
    /// Requests that do not install the core go straight to the packs.
    /// Requested packs are planned before the core is touched and applied
    /// after it.
    ///
    /// Repair is only offered when the installed and available versions
    /// match; across versions, modified files are handled by the update's
    /// own backup decision.
    fn install_over_existing(
        &self,
        request: &InstallRequest,
        manifest: Manifest,
        decider: &mut dyn Decider,
    ) -> Result<Outcome> {
        let target = request.target_root();
        if !request.installs_core() {
            tracing::info!(
                installed = %manifest.version,
                "Leaving the core install as it is"
            );
            return self.install_expansion_packs(
                &target,
                &request.expansion_packs,
                &request.ides,
                decider,
            );
        }

        let available = self.source.core_version();
        let integrity = check_integrity(&target, &manifest);
        let ordering = compare_versions(&manifest.version, &available);

        let mut decision = DecisionRequest::new(
            DecisionKind::ExistingInstall,
            format!(
                "Found existing installation v{} (available v{available})",
                manifest.version
            ),
        );
        if !integrity.is_clean() {
            decision = decision.detail(format!(
                "{} missing and {} modified files",
                integrity.missing.len(),
                integrity.modified.len()
            ));
        }

        let mut default = if request.expansion_packs.is_empty() {
            ChoiceId::Cancel
        } else {
            ChoiceId::ExpansionsOnly
        };
        match ordering {
            Ordering::Less => {
                decision = decision.choice(ChoiceId::Upgrade, format!("Upgrade to v{available}"));
                default = ChoiceId::Upgrade;
            }
            Ordering::Equal => {
                if !integrity.is_clean() {
                    decision = decision.choice(
                        ChoiceId::Repair,
                        "Repair (restore missing and modified files)",
                    );
                    default = ChoiceId::Repair;
                }
                decision = decision.choice(ChoiceId::Reinstall, "Reinstall (overwrite all files)");
            }
            Ordering::Greater => {
                decision =
                    decision.choice(ChoiceId::Downgrade, format!("Downgrade to v{available}"));
            }
        }
        let decision = decision
            .choice(ChoiceId::ExpansionsOnly, "Install expansion packs only")
            .choice(ChoiceId::Cancel, "Cancel")
            .default_choice(default);

        match ask(decider, &decision)? {
            choice @ (ChoiceId::Upgrade | ChoiceId::Repair) => {
                let Some(plans) = self.plan_packs(&target, &request.expansion_packs, decider)?
                else {
                    return Ok(Outcome::Cancelled);
                };
                let outcome = if choice == ChoiceId::Upgrade {
                    self.update_with(&target, &manifest, decider)?
                } else {
                    Outcome::Completed(self.repair_with(&target, &manifest, &integrity)?)
                };
                let Outcome::Completed(mut report) = outcome else {
                    return Ok(Outcome::Cancelled);
                };
                self.apply_pack_plans(&target, plans, &request.ides, &mut report)?;
                Ok(Outcome::Completed(report))
            }
            ChoiceId::Reinstall | ChoiceId::Downgrade => self.reinstall(request, decider),
            ChoiceId::ExpansionsOnly => self.install_expansion_packs(
                &target,
                &request.expansion_packs,
                &request.ides,
                decider,
            ),
            _ => Ok(Outcome::Cancelled),
        }
    }

    /// Write the requested core unit and packs without looking at what is
    /// already there.
    ///
    /// Pack decisions are collected first so a cancel writes nothing.
    pub fn fresh_install(
        &self,
        request: &InstallRequest,
        decider: &mut dyn Decider,
    ) -> Result<Outcome> {
        self.install_fresh_as(request, ReconcileAction::FreshInstall, false, decider)
    }

    pub(crate) fn install_fresh_as(
        &self,
        request: &InstallRequest,
        action: ReconcileAction,
        wipe_core: bool,
        decider: &mut dyn Decider,
    ) -> Result<Outcome> {
        request.validate()?;
        let target = request.target_root();

        let Some(plans) = self.plan_packs(&target, &request.expansion_packs, decider)? else {
            return Ok(Outcome::Cancelled);
        };

        if wipe_core && request.installs_core() {
            let core_dir = target.join(SquadPath::CoreMarker);
            tracing::info!(path = %core_dir.display(), "Removing existing core install");
            squad_fs::io::remove_dir_all(&core_dir)?;
        }

        let action = if request.installs_core() {
            action
        } else {
            ReconcileAction::ExpansionsOnly
        };
        let mut report = InstallReport::new(action, &target);
        if request.installs_core() {
            let core = self.write_core(request, HashSet::new())?;
            report.absorb_core(core);
            if wipe_core {
                report.removed_legacy = cleanup_legacy_yml(&target, &UnitMarker::Core)?;
            }
        }
        self.apply_pack_plans(&target, plans, &request.ides, &mut report)?;

        tracing::info!(
            target = %target.display(),
            files = report.files.len(),
            "{action} complete"
        );
        Ok(Outcome::Completed(report))
    }

    /// Copy the core unit and write its manifest.
    ///
    /// Paths in `preserve` are recorded as modified and left untouched.
    pub(crate) fn write_core(
        &self,
        request: &InstallRequest,
        preserve: HashSet<String>,
    ) -> Result<CoreInstall> {
        let target = request.target_root();
        let mut writer = UnitWriter::new(&target, &UnitMarker::Core).preserve(preserve);
        let mut warnings = Vec::new();

        match request.install_type {
            InstallType::Full => {
                writer.copy_tree(&self.source.primary_dir(), "", false)?;
            }
            InstallType::SingleAgent | InstallType::Team => {
                let unit = unit_for(request)?;
                let set = DependencyResolver::new(&self.source).resolve(&unit)?;
                self.write_resolved(&mut writer, &set)?;
                warnings.extend(set.warnings.iter().map(ToString::to_string));

                let config = self.source.primary_dir().join(SquadPath::CoreConfig);
                if config.is_file() {
                    writer.copy(&config, SquadPath::CoreConfig.as_str())?;
                }
            }
            InstallType::ExpansionPack | InstallType::ExpansionOnly => {
                return Err(Error::InvalidRequest(format!(
                    "{} does not install the core",
                    request.install_type
                )));
            }
        }
        writer.copy_tree(&self.source.shared_dir(), "", true)?;

        let written = writer.finish();
        let mut manifest = Manifest::new(self.source.core_version(), request.install_type)
            .with_files(written.records.clone());
        manifest.agent = request.agent.clone();
        manifest.team = request.team.clone();
        manifest.ides_configured = request.ides.iter().cloned().collect();
        manifest.expansion_packs = request.expansion_packs.clone();
        self.manifests.write(&target, &UnitMarker::Core, &manifest)?;

        Ok(CoreInstall {
            manifest,
            written,
            warnings,
        })
    }

    /// Write a resolved unit: its own file, its members, then its resources.
    pub(crate) fn write_resolved(
        &self,
        writer: &mut UnitWriter,
        set: &ResolvedDependencySet,
    ) -> Result<()> {
        writer.copy(&set.definition.path, &set.definition.install_relative())?;
        for member in &set.members {
            writer.copy(&member.path, &member.install_relative())?;
        }
        for resource in set.resources.values() {
            let inner = resource.key.install_relative();
            match resource.origin {
                StoreOrigin::Primary => writer.write(&inner, resource.content.as_bytes())?,
                StoreOrigin::Shared => {
                    let rendered = render_placeholder(&resource.content, writer.marker());
                    writer.write(&inner, rendered.as_bytes())?
                }
            };
        }
        Ok(())
    }
}

fn unit_for(request: &InstallRequest) -> Result<UnitRef> {
    let missing =
        || Error::InvalidRequest(format!("{} install without a unit id", request.install_type));
    match request.install_type {
        InstallType::SingleAgent => request.agent.clone().map(UnitRef::agent).ok_or_else(missing),
        _ => request.team.clone().map(UnitRef::team).ok_or_else(missing),
    }
}
