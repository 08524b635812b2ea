//! Update and repair command implementations

use std::cmp::Ordering;
use std::path::Path;

use colored::Colorize;
use squad_core::{Reconciler, UnitMarker, compare_versions};

use crate::commands::output::{print_outcome, print_report};
use crate::error::Result;
use crate::interactive;

/// Run the update command
///
/// An installation already at the available version is left alone.
pub fn run_update(reconciler: &Reconciler, target: &Path, yes: bool) -> Result<()> {
    let manifest = reconciler
        .manifests()
        .read(target, &UnitMarker::Core)
        .require(target)?;
    let available = reconciler.source().core_version();

    if compare_versions(&manifest.version, &available) == Ordering::Equal {
        println!(
            "{} Already up to date (v{}).",
            "OK".green().bold(),
            manifest.version
        );
        println!("Run {} to restore changed files.", "ai-squad repair".cyan());
        return Ok(());
    }

    println!(
        "{} Updating v{} to v{} in {}",
        "=>".blue().bold(),
        manifest.version,
        available,
        target.display()
    );
    let mut decider = interactive::decider(yes);
    let outcome = reconciler.update(target, decider.as_mut())?;
    print_outcome(&outcome);
    Ok(())
}

/// Run the repair command
pub fn run_repair(reconciler: &Reconciler, target: &Path) -> Result<()> {
    println!(
        "{} Repairing installation in {}",
        "=>".blue().bold(),
        target.display()
    );
    let report = reconciler.repair(target)?;
    if report.restored.is_empty() && report.removed_legacy.is_empty() {
        println!("{} Installation is already healthy. Nothing to repair.", "OK".green().bold());
        return Ok(());
    }
    print_report(&report);
    Ok(())
}
