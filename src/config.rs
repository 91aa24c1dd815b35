//! Probe configuration from an optional TOML file and environment variables.
//!
//! The file is read first, then `CAPPROBE_*` variables override it. Invalid
//! environment values fall back to the file or default value without
//! crashing; an unreadable or malformed file is an error.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `CAPPROBE_ECHO_URL` | `https://httpbin.org` | Echo endpoint base URL |
//! | `CAPPROBE_RSA_BITS` | 1024 | RSA key size (512..=4096) |
//! | `CAPPROBE_DELAY_MS` | 1000 | System delay checked (max 60000) |
//! | `CAPPROBE_HTTP_TIMEOUT_MS` | 100000 | HTTP connect timeout (min 1) |
//! | `CAPPROBE_ACCEPT_INVALID_CERTS` | false | Skip TLS certificate checks |
//! | `CAPPROBE_PASSPORT` | empty | Passed to the passport hook |
//! | `CAPPROBE_FAIL_FAST` | false | Stop at the first failing group |
//! | `CAPPROBE_SINK` | console | Logger sink (`console` or `tracing`) |
//! | `CAPPROBE_LOG_LEVEL` | info | Tracing filter |
//! | `CAPPROBE_LOG_FORMAT` | json | `json` or `pretty` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::crypto::rsa_keys::{MAX_KEY_BITS, MIN_KEY_BITS};
use crate::capability::LoggerSink;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_ECHO_URL: &str = "https://httpbin.org";
pub const DEFAULT_RSA_BITS: usize = 1024;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 100_000;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything a checklist run needs to know.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub echo_base_url: String,
    pub rsa_bits: usize,
    pub delay_ms: u64,
    pub http_timeout: Duration,
    pub accept_invalid_certs: bool,
    pub passport: String,
    pub fail_fast: bool,
    pub sink: LoggerSink,
    pub log: LogConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            echo_base_url: DEFAULT_ECHO_URL.to_string(),
            rsa_bits: DEFAULT_RSA_BITS,
            delay_ms: DEFAULT_DELAY_MS,
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            accept_invalid_certs: false,
            passport: String::new(),
            fail_fast: false,
            sink: LoggerSink::Console,
            log: LogConfig::default(),
        }
    }
}

/// On-disk form. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    echo_base_url: Option<String>,
    rsa_bits: Option<usize>,
    delay_ms: Option<u64>,
    http_timeout_ms: Option<u64>,
    accept_invalid_certs: Option<bool>,
    passport: Option<String>,
    fail_fast: Option<bool>,
    sink: Option<LoggerSink>,
    log: FileLogConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileLogConfig {
    level: Option<String>,
    format: Option<LogFormat>,
    output_path: Option<PathBuf>,
}

impl FileConfig {
    fn apply(self, cfg: &mut RunnerConfig) {
        if let Some(v) = self.echo_base_url {
            cfg.echo_base_url = v;
        }
        if let Some(v) = self.rsa_bits {
            cfg.rsa_bits = v;
        }
        if let Some(v) = self.delay_ms {
            cfg.delay_ms = v;
        }
        if let Some(v) = self.http_timeout_ms {
            cfg.http_timeout = Duration::from_millis(v);
        }
        if let Some(v) = self.accept_invalid_certs {
            cfg.accept_invalid_certs = v;
        }
        if let Some(v) = self.passport {
            cfg.passport = v;
        }
        if let Some(v) = self.fail_fast {
            cfg.fail_fast = v;
        }
        if let Some(v) = self.sink {
            cfg.sink = v;
        }
        if let Some(v) = self.log.level {
            cfg.log.level = v;
        }
        if let Some(v) = self.log.format {
            cfg.log.format = v;
        }
        if self.log.output_path.is_some() {
            cfg.log.output_path = self.log.output_path;
        }
    }
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn parse_with<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

fn apply_env(cfg: &mut RunnerConfig) {
    if let Ok(url) = std::env::var("CAPPROBE_ECHO_URL") {
        if !url.trim().is_empty() {
            cfg.echo_base_url = url.trim().to_string();
        }
    }
    cfg.rsa_bits = parse_usize("CAPPROBE_RSA_BITS", cfg.rsa_bits);
    cfg.delay_ms = parse_u64("CAPPROBE_DELAY_MS", cfg.delay_ms);
    let timeout_ms = parse_u64(
        "CAPPROBE_HTTP_TIMEOUT_MS",
        cfg.http_timeout.as_millis() as u64,
    );
    cfg.http_timeout = Duration::from_millis(timeout_ms);
    cfg.accept_invalid_certs =
        parse_bool("CAPPROBE_ACCEPT_INVALID_CERTS", cfg.accept_invalid_certs);
    if let Ok(passport) = std::env::var("CAPPROBE_PASSPORT") {
        cfg.passport = passport;
    }
    cfg.fail_fast = parse_bool("CAPPROBE_FAIL_FAST", cfg.fail_fast);
    cfg.sink = parse_with("CAPPROBE_SINK", cfg.sink);
    if let Ok(level) = std::env::var("CAPPROBE_LOG_LEVEL") {
        if !level.trim().is_empty() {
            cfg.log.level = level.trim().to_string();
        }
    }
    cfg.log.format = parse_with("CAPPROBE_LOG_FORMAT", cfg.log.format);
}

fn sanitize(cfg: &mut RunnerConfig) {
    cfg.rsa_bits = cfg.rsa_bits.clamp(MIN_KEY_BITS, MAX_KEY_BITS);
    cfg.delay_ms = cfg.delay_ms.min(MAX_DELAY_MS);
    cfg.http_timeout = cfg.http_timeout.max(Duration::from_millis(1));
    let trimmed = cfg.echo_base_url.trim_end_matches('/').len();
    cfg.echo_base_url.truncate(trimmed);
}

/// Load configuration from environment variables only.
pub fn load() -> RunnerConfig {
    let mut cfg = RunnerConfig::default();
    apply_env(&mut cfg);
    sanitize(&mut cfg);
    cfg
}

/// Load `path` (if any), then apply environment overrides.
pub fn load_from(path: Option<&Path>) -> Result<RunnerConfig, ConfigError> {
    let mut cfg = RunnerConfig::default();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        file.apply(&mut cfg);
    }
    apply_env(&mut cfg);
    sanitize(&mut cfg);
    Ok(cfg)
}

/// Serializable summary of the effective values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub echo_url: String,
    pub rsa_bits: usize,
    pub delay_ms: u64,
    pub http_timeout_ms: u64,
    pub accept_invalid_certs: bool,
    pub passport_set: bool,
    pub fail_fast: bool,
    pub sink: LoggerSink,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl RunnerConfig {
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            echo_url: self.echo_base_url.clone(),
            rsa_bits: self.rsa_bits,
            delay_ms: self.delay_ms,
            http_timeout_ms: self.http_timeout.as_millis() as u64,
            accept_invalid_certs: self.accept_invalid_certs,
            passport_set: !self.passport.is_empty(),
            fail_fast: self.fail_fast,
            sink: self.sink,
            log_level: self.log.level.clone(),
            log_format: self.log.format,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_env::{clear_env_vars, lock};
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = lock();
        let cfg = load();
        assert_eq!(cfg.echo_base_url, "https://httpbin.org");
        assert_eq!(cfg.rsa_bits, 1024);
        assert_eq!(cfg.delay_ms, 1000);
        assert_eq!(cfg.http_timeout, Duration::from_secs(100));
        assert!(!cfg.accept_invalid_certs);
        assert!(cfg.passport.is_empty());
        assert!(!cfg.fail_fast);
        assert_eq!(cfg.sink, LoggerSink::Console);
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.format, LogFormat::Json);
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = lock();
        std::env::set_var("CAPPROBE_ECHO_URL", "http://127.0.0.1:8080/");
        std::env::set_var("CAPPROBE_RSA_BITS", "2048");
        std::env::set_var("CAPPROBE_DELAY_MS", "250");
        std::env::set_var("CAPPROBE_FAIL_FAST", "yes");
        std::env::set_var("CAPPROBE_SINK", "tracing");
        std::env::set_var("CAPPROBE_LOG_FORMAT", "pretty");
        let cfg = load();
        assert_eq!(cfg.echo_base_url, "http://127.0.0.1:8080");
        assert_eq!(cfg.rsa_bits, 2048);
        assert_eq!(cfg.delay_ms, 250);
        assert!(cfg.fail_fast);
        assert_eq!(cfg.sink, LoggerSink::Tracing);
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = lock();
        std::env::set_var("CAPPROBE_RSA_BITS", "lots");
        std::env::set_var("CAPPROBE_DELAY_MS", "-5");
        std::env::set_var("CAPPROBE_ACCEPT_INVALID_CERTS", "maybe");
        std::env::set_var("CAPPROBE_LOG_FORMAT", "xml");
        let cfg = load();
        assert_eq!(cfg.rsa_bits, 1024);
        assert_eq!(cfg.delay_ms, 1000);
        assert!(!cfg.accept_invalid_certs);
        assert_eq!(cfg.log.format, LogFormat::Json);
        clear_env_vars();
    }

    #[test]
    fn test_values_are_clamped() {
        let _lock = lock();
        std::env::set_var("CAPPROBE_RSA_BITS", "64");
        std::env::set_var("CAPPROBE_DELAY_MS", "999999");
        std::env::set_var("CAPPROBE_HTTP_TIMEOUT_MS", "0");
        let cfg = load();
        assert_eq!(cfg.rsa_bits, 512);
        assert_eq!(cfg.delay_ms, 60_000);
        assert_eq!(cfg.http_timeout, Duration::from_millis(1));

        std::env::set_var("CAPPROBE_RSA_BITS", "100000");
        assert_eq!(load().rsa_bits, 4096);
        clear_env_vars();
    }

    #[test]
    fn test_file_values_overridden_by_env() {
        let _lock = lock();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "rsa_bits = 2048\ndelay_ms = 10\npassport = \"from-file\"\n\n[log]\nlevel = \"debug\""
        )
        .unwrap();
        std::env::set_var("CAPPROBE_DELAY_MS", "20");

        let cfg = load_from(Some(file.path())).unwrap();
        assert_eq!(cfg.rsa_bits, 2048);
        assert_eq!(cfg.delay_ms, 20);
        assert_eq!(cfg.passport, "from-file");
        assert_eq!(cfg.log.level, "debug");
        clear_env_vars();
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let _lock = lock();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rsa_bitz = 2048").unwrap();
        assert!(matches!(
            load_from(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_rejected() {
        let _lock = lock();
        assert!(matches!(
            load_from(Some(Path::new("/nonexistent/capprobe.toml"))),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_effective_config_hides_passport() {
        let _lock = lock();
        std::env::set_var("CAPPROBE_PASSPORT", "secret-token");
        let eff = load().effective_config();
        assert!(eff.passport_set);
        let rendered = serde_json::to_string(&eff).unwrap();
        assert!(!rendered.contains("secret-token"));
        clear_env_vars();
    }
}
