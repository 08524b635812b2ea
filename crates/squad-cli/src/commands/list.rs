//! List commands for agents, teams and expansion packs

use colored::Colorize;
use squad_core::SourceStore;

use crate::error::Result;

/// Run the list-agents command
pub fn run_list_agents(source: &SourceStore) -> Result<()> {
    let agents = source.list_agents()?;
    println!("{}", "Available Agents".bold());
    println!();
    for agent in &agents {
        println!("  {}", agent.green());
    }
    println!();
    println!(
        "{} {} agents. Use {} to install one.",
        "Total:".dimmed(),
        agents.len(),
        "ai-squad install --agent <id>".cyan()
    );
    Ok(())
}

/// Run the list-teams command
pub fn run_list_teams(source: &SourceStore) -> Result<()> {
    let teams = source.list_teams()?;
    println!("{}", "Available Teams".bold());
    println!();
    for team in &teams {
        println!("  {}", team.green());
    }
    println!();
    println!(
        "{} {} teams. Use {} to install one.",
        "Total:".dimmed(),
        teams.len(),
        "ai-squad install --team <id>".cyan()
    );
    Ok(())
}

/// Run the list-expansions command
pub fn run_list_expansions(source: &SourceStore) -> Result<()> {
    let packs = source.list_packs()?;
    println!("{}", "Available Expansion Packs".bold());
    println!();
    for pack in &packs {
        println!(
            "  {:<20} v{:<8} {}",
            pack.id.green(),
            pack.version,
            pack.name
        );
        if let Some(description) = &pack.description {
            println!("  {:<20} {}", "", description.dimmed());
        }
    }
    println!();
    println!(
        "{} {} packs. Use {} to add one.",
        "Total:".dimmed(),
        packs.len(),
        "ai-squad install -e <id>".cyan()
    );
    Ok(())
}
