//! `capprobe run`, `capprobe groups` and `capprobe self-test`.

use crate::capability::Capabilities;
use crate::checklist::{ChecklistRunner, Fixtures, Group, RunReport};
use crate::config::{self, RunnerConfig};
use crate::error::ChecklistError;
use crate::selftest;
use crate::telemetry;

use super::args::RunArgs;
use super::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};

/// Run the checklist described by `args`. Returns the process exit code.
pub fn run_checklist(args: &RunArgs) -> i32 {
    let mut cfg = match config::load_from(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };
    apply_overrides(&mut cfg, args);

    if let Err(e) = telemetry::init_logging(&cfg.log) {
        eprintln!("Logging setup failed: {}", e);
        return EXIT_CONFIG_ERROR;
    }

    if !args.skip_self_test {
        if let Err(e) = selftest::run_self_tests() {
            eprintln!("Crypto self-test FAILED: {}", e);
            return EXIT_FAILURE;
        }
        tracing::info!("Crypto self-tests passed");
    }

    let caps = match Capabilities::standard(&cfg) {
        Ok(caps) => caps,
        Err(e) => {
            eprintln!("Failed to set up capabilities: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };
    let runner = ChecklistRunner::new(caps, Fixtures::from_config(&cfg))
        .with_passport(cfg.passport.clone());

    let groups = resolve_groups(&args.groups);
    match execute(&runner, &groups, cfg.fail_fast) {
        Ok(report) => {
            if args.json_report {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Failed to render report: {}", e),
                }
            }
            if report.passed() {
                EXIT_SUCCESS
            } else {
                eprintln!("Failed groups: {:?}", report.failed_groups());
                EXIT_FAILURE
            }
        }
        Err(e) => {
            eprintln!("Checklist aborted: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Best-effort or fail-fast run of `groups`.
pub fn execute(
    runner: &ChecklistRunner,
    groups: &[Group],
    fail_fast: bool,
) -> Result<RunReport, ChecklistError> {
    if fail_fast {
        runner.run_strict(groups)
    } else {
        Ok(runner.run_groups(groups))
    }
}

/// Command-line flags win over file and environment.
pub fn apply_overrides(cfg: &mut RunnerConfig, args: &RunArgs) {
    if let Some(passport) = &args.passport {
        cfg.passport = passport.clone();
    }
    if args.fail_fast {
        cfg.fail_fast = true;
    }
    if let Some(sink) = args.sink {
        cfg.sink = sink;
    }
}

/// Empty selection means every group.
pub fn resolve_groups(requested: &[Group]) -> Vec<Group> {
    if requested.is_empty() {
        Group::ALL.to_vec()
    } else {
        Group::canonical(requested)
    }
}

pub fn run_groups_list() -> i32 {
    for group in Group::ALL {
        println!("{}", group);
    }
    EXIT_SUCCESS
}

pub fn run_self_test() -> i32 {
    match selftest::run_self_tests() {
        Ok(_) => {
            println!("Crypto self-tests: PASSED");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Crypto self-test FAILED: {}", e);
            EXIT_FAILURE
        }
    }
}
