//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::capability::LoggerSink;
use crate::checklist::Group;

#[derive(Debug, Parser)]
#[command(name = "capprobe")]
#[command(about = "Conformance checklist runner for host capability sets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the checklist (default)
    Run(RunArgs),
    /// List capability groups in run order
    Groups,
    /// Run the crypto known-answer tests
    SelfTest,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,

        /// TOML configuration file
        #[arg(short, long, env = "CAPPROBE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Print effective values (file + environment)
    Show,
    /// Print built-in defaults
    Defaults,
    /// Check for misconfigurations
    Validate,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Groups to run, comma separated (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub groups: Vec<Group>,

    /// Passport handed to the host hook
    #[arg(long)]
    pub passport: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "CAPPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop at the first failing group
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip the crypto known-answer tests
    #[arg(long)]
    pub skip_self_test: bool,

    /// Logger sink: console or tracing
    #[arg(long)]
    pub sink: Option<LoggerSink>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json_report: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_groups() {
        let cli = Cli::parse_from([
            "capprobe",
            "run",
            "--groups",
            "crypto,logger",
            "--fail-fast",
            "--sink",
            "tracing",
        ]);
        match cli.command {
            Some(Command::Run(args)) => {
                assert_eq!(args.groups, vec![Group::Crypto, Group::Tools]);
                assert!(args.fail_fast);
                assert_eq!(args.sink, Some(LoggerSink::Tracing));
                assert!(!args.skip_self_test);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_group_rejected() {
        assert!(Cli::try_parse_from(["capprobe", "run", "--groups", "network"]).is_err());
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::parse_from(["capprobe", "config", "validate"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: Some(ConfigAction::Validate),
                ..
            })
        ));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["capprobe"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
