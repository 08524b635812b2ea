//! Human-readable rendering of operation reports

use colored::Colorize;
use squad_core::{InstallReport, Outcome};

/// Print a completed report, or the cancellation notice.
pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Completed(report) => print_report(report),
        Outcome::Cancelled => {
            println!("{} Operation cancelled. Nothing was changed.", "=>".blue().bold())
        }
    }
}

pub fn print_report(report: &InstallReport) {
    let version = report
        .version
        .as_deref()
        .map(|v| format!(" v{v}"))
        .unwrap_or_default();
    println!(
        "{} {}{} complete: {} files in {}",
        "OK".green().bold(),
        capitalize(&report.action.to_string()),
        version,
        report.files.len(),
        report.target.display()
    );

    for pack in &report.packs {
        println!(
            "   {} {} v{} ({})",
            "+".green(),
            pack.id.cyan(),
            pack.version,
            pack.action
        );
    }
    for path in &report.restored {
        println!("   {} restored {}", "+".green(), path);
    }
    for backup in &report.backups {
        println!(
            "   {} backed up {} to {}",
            "~".yellow(),
            backup.original,
            backup.backup.display()
        );
    }
    for path in &report.preserved {
        println!("   {} kept your changes to {}", "~".yellow(), path);
    }
    for path in &report.removed_legacy {
        println!("   {} removed legacy {}", "-".yellow(), path.dimmed());
    }

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("{} {}", "warning:".yellow().bold(), warning);
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("expansion install"), "Expansion install");
        assert_eq!(capitalize(""), "");
    }
}
