//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AI Squad - Install and maintain agent squads in your project
#[derive(Parser, Debug)]
#[command(name = "ai-squad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Source store to install from
    #[arg(long, global = true, env = "AI_SQUAD_SOURCE", default_value = ".")]
    pub source: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install agents into a project
    ///
    /// Without a selection flag, the full squad is installed.
    ///
    /// Examples:
    ///   ai-squad install                      # Full install in current directory
    ///   ai-squad install --agent dev -d app   # One agent into app/
    ///   ai-squad install --team team-dev      # A team bundle
    ///   ai-squad install -e infra --yes       # Full install plus a pack, no prompts
    Install {
        /// Install every agent
        #[arg(long, conflicts_with_all = ["agent", "team", "expansion_only"])]
        full: bool,

        /// Install a single agent and its dependencies
        #[arg(long, conflicts_with_all = ["team", "expansion_only"])]
        agent: Option<String>,

        /// Install a team bundle
        #[arg(long, conflicts_with = "expansion_only")]
        team: Option<String>,

        /// Install expansion packs without the core
        #[arg(long, requires = "expansion_packs")]
        expansion_only: bool,

        /// Target project directory
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// IDEs to record as configured
        #[arg(short, long = "ide")]
        ides: Vec<String>,

        /// Expansion packs to install (comma separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        expansion_packs: Vec<String>,

        /// Preferred language for installed content
        #[arg(long)]
        language: Option<String>,

        /// Accept the default answer for every question
        #[arg(short, long)]
        yes: bool,
    },

    /// Update an existing installation to the available version
    Update {
        /// Project directory (defaults to the nearest installation)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Accept the default answer for every question
        #[arg(short, long)]
        yes: bool,
    },

    /// Restore missing and modified files of an installation
    Repair {
        /// Project directory (defaults to the nearest installation)
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },

    /// Show installation status
    Status {
        /// Project directory (defaults to the nearest installation)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Verify installed files against their manifests
    ///
    /// Exits non-zero when any file is missing or modified.
    Check {
        /// Project directory (defaults to the nearest installation)
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// List what the source store offers
    List {
        #[command(subcommand)]
        what: ListTarget,
    },
}

/// Things that can be listed
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    /// Agents in the core
    Agents,
    /// Team bundles in the core
    Teams,
    /// Expansion packs
    Expansions,
}
