//! AI Squad CLI
//!
//! Installs agents, teams and expansion packs from a source store into a
//! project, and keeps existing installations up to date.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use squad_core::{Reconciler, SourceStore};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ListTarget};
use commands::InstallArgs;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd, Reconciler::new(SourceStore::new(cli.source))),
        None => {
            println!("{} AI Squad installer", "ai-squad".green().bold());
            println!();
            println!("Run {} for available commands.", "ai-squad --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` means debug and the default is warn.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands, reconciler: Reconciler) -> Result<()> {
    match cmd {
        Commands::Install {
            full: _,
            agent,
            team,
            expansion_only,
            directory,
            ides,
            expansion_packs,
            language,
            yes,
        } => commands::run_install(
            &reconciler,
            InstallArgs {
                agent,
                team,
                expansion_only,
                directory,
                ides,
                expansion_packs,
                language,
                yes,
            },
        ),
        Commands::Update { directory, yes } => {
            commands::run_update(&reconciler, &context::resolve_target(directory)?, yes)
        }
        Commands::Repair { directory } => {
            commands::run_repair(&reconciler, &context::resolve_target(directory)?)
        }
        Commands::Status { directory, json } => {
            commands::run_status(&reconciler, &context::resolve_target(directory)?, json)
        }
        Commands::Check { directory, json } => {
            commands::run_check(&reconciler, &context::resolve_target(directory)?, json)
        }
        Commands::List { what } => match what {
            ListTarget::Agents => commands::run_list_agents(reconciler.source()),
            ListTarget::Teams => commands::run_list_teams(reconciler.source()),
            ListTarget::Expansions => commands::run_list_expansions(reconciler.source()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_test_utils::{TestSource, TestTarget};

    fn reconciler(source: &TestSource) -> Reconciler {
        Reconciler::new(SourceStore::new(source.root()))
    }

    fn install_full(source: &TestSource, target: &TestTarget) {
        let args = InstallArgs {
            directory: Some(target.root().to_path_buf()),
            yes: true,
            ..Default::default()
        };
        commands::run_install(&reconciler(source), args).unwrap();
    }

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_install_then_status() {
        let source = TestSource::standard();
        let target = TestTarget::new();
        install_full(&source, &target);

        target.assert_file_exists(".ai-squad-core/install-manifest.yaml");
        assert!(commands::run_status(&reconciler(&source), target.root(), false).is_ok());
        assert!(commands::run_status(&reconciler(&source), target.root(), true).is_ok());
    }

    #[test]
    fn test_check_fails_on_modified_file() {
        let source = TestSource::standard();
        let target = TestTarget::new();
        install_full(&source, &target);
        let reconciler = reconciler(&source);

        assert!(commands::run_check(&reconciler, target.root(), false).is_ok());
        target.write(".ai-squad-core/agents/dev.md", "edited");
        assert!(commands::run_check(&reconciler, target.root(), true).is_err());

        commands::run_repair(&reconciler, target.root()).unwrap();
        assert!(commands::run_check(&reconciler, target.root(), false).is_ok());
    }

    #[test]
    fn test_update_same_version_is_a_no_op() {
        let source = TestSource::standard();
        let target = TestTarget::new();
        install_full(&source, &target);
        target.write(".ai-squad-core/agents/dev.md", "edited");

        commands::run_update(&reconciler(&source), target.root(), true).unwrap();

        assert_eq!(target.read(".ai-squad-core/agents/dev.md"), "edited");
    }

    #[test]
    fn test_update_without_install_fails() {
        let source = TestSource::standard();
        let target = TestTarget::new();
        assert!(commands::run_update(&reconciler(&source), target.root(), true).is_err());
    }

    #[test]
    fn test_list_commands() {
        let source = TestSource::standard();
        let store = SourceStore::new(source.root());
        assert!(commands::run_list_agents(&store).is_ok());
        assert!(commands::run_list_teams(&store).is_ok());
        assert!(commands::run_list_expansions(&store).is_ok());
    }
}
