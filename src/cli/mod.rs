//! CLI module for the `capprobe` binary.
//!
//! ## Usage
//!
//! ```bash
//! capprobe                      # Run every group (same as `capprobe run`)
//! capprobe run --groups crypto  # Run a subset
//! capprobe groups               # List groups in run order
//! capprobe self-test            # Crypto known-answer tests
//! capprobe config validate      # Check configuration
//! ```
//!
//! ## Exit codes
//!
//! `0` success, `1` failure, `2` configuration error.

pub mod args;
pub mod config_cmd;
pub mod run_cmd;

pub use args::{Cli, Command, ConfigAction, RunArgs};
pub use run_cmd::{run_checklist, run_groups_list, run_self_test};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Dispatch a parsed command line. Returns the process exit code.
pub fn dispatch(cli: Cli) -> i32 {
    match cli.command {
        None => run_checklist(&RunArgs::default()),
        Some(Command::Run(args)) => run_checklist(&args),
        Some(Command::Groups) => run_groups_list(),
        Some(Command::SelfTest) => run_self_test(),
        Some(Command::Config { action, config }) => {
            let path = config.as_deref();
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => config_cmd::run_show(path),
                ConfigAction::Defaults => config_cmd::run_defaults(),
                ConfigAction::Validate => config_cmd::run_validate(path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_dispatch_groups() {
        let cli = Cli::parse_from(["capprobe", "groups"]);
        assert_eq!(dispatch(cli), EXIT_SUCCESS);
    }

    #[test]
    fn test_dispatch_config_defaults() {
        let cli = Cli::parse_from(["capprobe", "config", "defaults"]);
        assert_eq!(dispatch(cli), EXIT_SUCCESS);
    }
}
