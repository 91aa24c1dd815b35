//! Config CLI subcommands: show, defaults, validate.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use super::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{self, EffectiveConfig, RunnerConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show(path: Option<&Path>) -> i32 {
    match config::load_from(path) {
        Ok(cfg) => {
            print_lines(&render(&cfg.effective_config()));
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            EXIT_CONFIG_ERROR
        }
    }
}

/// Print default config values (no file, no env overrides) to stdout.
pub fn run_defaults() -> i32 {
    print_lines(&render(&RunnerConfig::default().effective_config()));
    EXIT_SUCCESS
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found, 2 if it cannot be loaded.
pub fn run_validate(path: Option<&Path>) -> i32 {
    let cfg = match config::load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let warnings = validate(&cfg);
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

pub fn validate(cfg: &RunnerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !(cfg.echo_base_url.starts_with("http://") || cfg.echo_base_url.starts_with("https://")) {
        warnings.push(format!(
            "CAPPROBE_ECHO_URL ({}) is not an http(s) URL",
            cfg.echo_base_url
        ));
    }
    if cfg.rsa_bits < 1024 {
        warnings.push(format!(
            "CAPPROBE_RSA_BITS ({}) is below 1024; keys are weak",
            cfg.rsa_bits
        ));
    }
    if cfg.accept_invalid_certs {
        warnings.push("CAPPROBE_ACCEPT_INVALID_CERTS is on; TLS is not verified".to_string());
    }
    if let Err(e) = EnvFilter::try_new(&cfg.log.level) {
        warnings.push(format!("CAPPROBE_LOG_LEVEL ({}) is invalid: {}", cfg.log.level, e));
    }

    warnings
}

fn render(cfg: &EffectiveConfig) -> Vec<String> {
    vec![
        format!("CAPPROBE_ECHO_URL={}", cfg.echo_url),
        format!("CAPPROBE_RSA_BITS={}", cfg.rsa_bits),
        format!("CAPPROBE_DELAY_MS={}", cfg.delay_ms),
        format!("CAPPROBE_HTTP_TIMEOUT_MS={}", cfg.http_timeout_ms),
        format!("CAPPROBE_ACCEPT_INVALID_CERTS={}", cfg.accept_invalid_certs),
        format!(
            "CAPPROBE_PASSPORT={}",
            if cfg.passport_set { "<set>" } else { "" }
        ),
        format!("CAPPROBE_FAIL_FAST={}", cfg.fail_fast),
        format!("CAPPROBE_SINK={}", cfg.sink),
        format!("CAPPROBE_LOG_LEVEL={}", cfg.log_level),
        format!("CAPPROBE_LOG_FORMAT={}", cfg.log_format),
    ]
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
