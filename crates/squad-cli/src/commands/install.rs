//! Install command implementation

use std::path::PathBuf;

use colored::Colorize;
use squad_core::{InstallRequest, InstallType, Reconciler};

use crate::commands::output::print_outcome;
use crate::error::Result;
use crate::interactive;

/// Flags of `ai-squad install`, as parsed.
#[derive(Debug, Clone, Default)]
pub struct InstallArgs {
    pub agent: Option<String>,
    pub team: Option<String>,
    pub expansion_only: bool,
    pub directory: Option<PathBuf>,
    pub ides: Vec<String>,
    pub expansion_packs: Vec<String>,
    pub language: Option<String>,
    pub yes: bool,
}

impl InstallArgs {
    /// Build the request; the selection flag decides the install type.
    pub fn into_request(self, cwd: PathBuf) -> InstallRequest {
        let target = self.directory.unwrap_or(cwd);
        let mut request = match (self.agent, self.team, self.expansion_only) {
            (Some(agent), _, _) => InstallRequest::single_agent(target, agent),
            (None, Some(team), _) => InstallRequest::team(target, team),
            (None, None, true) => InstallRequest::new(InstallType::ExpansionOnly, target),
            (None, None, false) => InstallRequest::full(target),
        };
        request = request
            .with_ides(self.ides)
            .with_expansion_packs(self.expansion_packs);
        if let Some(language) = self.language {
            request = request.with_language(language);
        }
        request
    }
}

/// Run the install command
pub fn run_install(reconciler: &Reconciler, args: InstallArgs) -> Result<()> {
    let yes = args.yes;
    let request = args.into_request(std::env::current_dir()?);

    println!(
        "{} Installing {} into {}",
        "=>".blue().bold(),
        request.install_type.to_string().cyan(),
        request.target_directory.display()
    );

    let mut decider = interactive::decider(yes);
    let outcome = reconciler.install(&request, decider.as_mut())?;
    print_outcome(&outcome);
    Ok(())
}
