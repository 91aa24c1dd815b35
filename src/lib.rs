//! capprobe
//!
//! A conformance checklist runner for host capability sets. A host exposes
//! five capability groups to its scripts (`crypto`, `json`, `requests`,
//! the `tools` logger and `system`); the runner calls each operation in a
//! fixed order, checks round trips, and logs every result.
//!
//! Capabilities are traits bundled into [`Capabilities`] and injected into
//! the [`ChecklistRunner`], so a host can check its own implementations and
//! tests can substitute mocks. The crate ships standard implementations
//! built on RustCrypto, `encoding_rs`, `serde_json` and `reqwest`.
//!
//! ```no_run
//! use capprobe::{config, Capabilities, ChecklistRunner, Fixtures};
//!
//! let cfg = config::load();
//! let caps = Capabilities::standard(&cfg).expect("http client");
//! let report = ChecklistRunner::new(caps, Fixtures::from_config(&cfg)).run();
//! assert!(report.passed());
//! ```

pub mod capability;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod selftest;
pub mod telemetry;

pub use capability::{
    Capabilities, Crypto, Json, Logger, NoopPassport, PassportHook, Requests, System,
};
pub use checklist::{ChecklistRunner, Fixtures, Group, GroupOutcome, GroupStatus, RunReport};
pub use config::RunnerConfig;
pub use error::{CapabilityError, ChecklistError, CryptoError, JsonError, RequestError};
