//! Command implementations for squad-cli

pub mod install;
pub mod list;
pub mod output;
pub mod status;
pub mod update;

pub use install::{InstallArgs, run_install};
pub use list::{run_list_agents, run_list_expansions, run_list_teams};
pub use status::{run_check, run_status};
pub use update::{run_repair, run_update};
