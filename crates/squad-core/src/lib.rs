//! Installation reconciliation and dependency resolution for AI Squad
//!
//! This crate decides what a target project directory should contain and
//! converges it there:
//!
//! - **Source store**: agents, teams, resources and expansion packs shipped
//!   with the installer
//! - **Manifests**: one record per install unit of every file written and
//!   its fingerprint
//! - **Resolver**: the closed set of resources an agent or team needs
//! - **Classifier**: what is already installed in a target
//! - **Reconciler**: fresh install, update, repair and reinstall
//!
//! # Architecture
//!
//! ```text
//!                  squad-cli
//!                      |
//!                 squad-core
//!   +---------+--------+---------+-----------+
//!   |         |        |         |           |
//! source  manifest  resolver   state     reconcile
//!                      |
//!                  squad-fs
//! ```
//!
//! The core never prompts. Every fork that needs a human is a
//! [`DecisionRequest`] answered through a [`Decider`].

pub mod decision;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod request;
pub mod resolver;
pub mod source;
pub mod state;
pub mod version;

pub use decision::{
    Choice, ChoiceId, Decider, DecisionKind, DecisionRequest, DefaultDecider, ScriptedDecider,
};
pub use error::{Error, Result};
pub use manifest::{
    FileRecord, InstallType, IntegrityReport, Manifest, ManifestRepository, ManifestStatus,
    UnitMarker, check_integrity,
};
pub use reconcile::{
    BackupRecord, InstallReport, InstallStatus, Outcome, PackAction, PackReport, PackStatus,
    ReconcileAction, Reconciler,
};
pub use request::InstallRequest;
pub use resolver::{
    DependencyResolver, ResolutionCache, ResolveWarning, ResolvedDependencySet, ResolvedResource,
    ResourceKey, UnitDefinition, UnitKind, UnitRef,
};
pub use source::{PackInfo, ResourceKind, SourceStore, StoreOrigin};
pub use state::{InstallationKind, InstallationState, OsProbe, PackState, StateClassifier, TargetProbe};
pub use version::compare_versions;
