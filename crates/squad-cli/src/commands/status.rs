//! Status and check command implementations

use std::path::Path;

use colored::Colorize;
use squad_core::{InstallStatus, InstallationKind, IntegrityReport, Reconciler};

use crate::error::{CliError, Result};

/// Run the status command
pub fn run_status(reconciler: &Reconciler, target: &Path, json: bool) -> Result<()> {
    let status = reconciler.status(target);
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "AI Squad Status".bold());
    println!();
    println!("{}:      {}", "Directory".dimmed(), status.target.display());

    match status.kind {
        InstallationKind::Clean => {
            println!("{}:      {}", "Installed".dimmed(), "no".yellow());
            println!();
            println!("Run {} to install.", "ai-squad install".cyan());
            return Ok(());
        }
        InstallationKind::ExistingLegacy => {
            println!("{}:      {}", "Installed".dimmed(), "legacy layout".yellow());
        }
        InstallationKind::ExistingUnmanaged => {
            println!("{}:      {}", "Installed".dimmed(), "no manifest".yellow());
        }
        InstallationKind::ExistingManaged => {}
    }

    if let Some(version) = &status.version {
        println!(
            "{}:        {} (available {})",
            "Version".dimmed(),
            version.cyan(),
            status.available_version
        );
    }
    if let Some(installed_at) = status.installed_at {
        println!("{}:   {}", "Installed at".dimmed(), installed_at.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(install_type) = status.install_type {
        println!("{}:   {}", "Install type".dimmed(), install_type);
    }
    if let Some(agent) = &status.agent {
        println!("{}:          {}", "Agent".dimmed(), agent.cyan());
    }
    if let Some(team) = &status.team {
        println!("{}:           {}", "Team".dimmed(), team.cyan());
    }
    if !status.ides.is_empty() {
        println!("{}:           {}", "IDEs".dimmed(), status.ides.join(", "));
    }
    println!("{}:          {}", "Files".dimmed(), status.total_files);
    if let Some(integrity) = &status.integrity {
        println!("{}:      {}", "Integrity".dimmed(), integrity_label(integrity));
    }
    println!();

    println!("{}:", "Expansion Packs".bold());
    if status.packs.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for pack in &status.packs {
        let version = pack.version.as_deref().unwrap_or("?");
        let state = match &pack.integrity {
            Some(integrity) => integrity_label(integrity),
            None => "no manifest".yellow().to_string(),
        };
        println!("  {} {} v{} ({})", "+".green(), pack.id.cyan(), version, state);
    }

    for diagnostic in &status.diagnostics {
        println!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
    Ok(())
}

/// Run the check command
///
/// Fails when any managed file is missing or modified.
pub fn run_check(reconciler: &Reconciler, target: &Path, json: bool) -> Result<()> {
    let status = reconciler.status(target);
    if status.kind != InstallationKind::ExistingManaged {
        return Err(CliError::user(format!(
            "No managed installation found in {}",
            target.display()
        )));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&CheckOutput::from(&status))?);
    } else {
        println!("{} Checking installation integrity...", "=>".blue().bold());
        if let Some(integrity) = &status.integrity {
            print_issues("core", integrity);
        }
        for pack in &status.packs {
            if let Some(integrity) = &pack.integrity {
                print_issues(&pack.id, integrity);
            }
        }
    }

    if status.is_healthy() {
        if !json {
            println!("{} All files match their manifests.", "OK".green().bold());
        }
        Ok(())
    } else {
        if !json {
            println!();
            println!("Run {} to restore them.", "ai-squad repair".cyan());
        }
        Err(CliError::user("Installation has missing or modified files"))
    }
}

#[derive(serde::Serialize)]
struct CheckOutput<'a> {
    healthy: bool,
    core: Option<&'a IntegrityReport>,
    packs: Vec<(&'a str, &'a IntegrityReport)>,
}

impl<'a> From<&'a InstallStatus> for CheckOutput<'a> {
    fn from(status: &'a InstallStatus) -> Self {
        Self {
            healthy: status.is_healthy(),
            core: status.integrity.as_ref(),
            packs: status
                .packs
                .iter()
                .filter_map(|p| p.integrity.as_ref().map(|i| (p.id.as_str(), i)))
                .collect(),
        }
    }
}

fn print_issues(unit: &str, integrity: &IntegrityReport) {
    for path in &integrity.missing {
        println!("   {} {} ({})", "-".yellow(), path.cyan(), unit.dimmed());
    }
    for path in &integrity.modified {
        println!("   {} {} ({}, modified)", "!".red(), path.cyan(), unit.dimmed());
    }
    for path in &integrity.rejected {
        println!("   {} {} ({}, outside target, ignored)", "?".yellow(), path, unit.dimmed());
    }
}

fn integrity_label(integrity: &IntegrityReport) -> String {
    if integrity.is_clean() {
        "intact".green().to_string()
    } else {
        format!(
            "{} missing, {} modified",
            integrity.missing.len(),
            integrity.modified.len()
        )
        .red()
        .to_string()
    }
}
