//! Capability traits and the bundle injected into the checklist runner.
//!
//! A host supplies one implementation per group. The `Standard*` types are
//! the crate's own implementations built on ecosystem crates.

pub mod crypto;
pub mod json;
pub mod logger;
pub mod requests;
pub mod system;

use std::sync::Arc;

pub use crypto::{Crypto, StandardCrypto};
pub use json::{Json, StandardJson};
pub use logger::{ConsoleLogger, LogKind, Logger, LoggerSink, MemoryLogger, TracingLogger};
pub use requests::{
    Body, ClientSettings, HttpResponse, RequestOptions, Requests, StandardRequests,
};
pub use system::{System, ThreadSystem};

use crate::config::RunnerConfig;
use crate::error::RequestError;

/// Host identity hook invoked once before a run.
pub trait PassportHook: Send + Sync {
    fn set_task_passport(&self, passport: &str);
}

/// Accepts any passport and does nothing with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPassport;

impl PassportHook for NoopPassport {
    fn set_task_passport(&self, passport: &str) {
        tracing::debug!(len = passport.len(), "Task passport ignored");
    }
}

/// One implementation of every capability group.
pub struct Capabilities {
    pub crypto: Box<dyn Crypto>,
    pub json: Box<dyn Json>,
    pub requests: Box<dyn Requests>,
    pub logger: Arc<dyn Logger>,
    pub system: Box<dyn System>,
    pub passport: Box<dyn PassportHook>,
}

impl Capabilities {
    /// Standard implementations configured from `config`.
    pub fn standard(config: &RunnerConfig) -> Result<Self, RequestError> {
        let requests = StandardRequests::new(ClientSettings {
            connect_timeout: config.http_timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        })?;
        let logger: Arc<dyn Logger> = match config.sink {
            LoggerSink::Console => Arc::new(ConsoleLogger::stdout()),
            LoggerSink::Tracing => Arc::new(TracingLogger),
        };
        Ok(Self {
            crypto: Box::new(StandardCrypto),
            json: Box::new(StandardJson),
            requests: Box::new(requests),
            logger,
            system: Box::new(ThreadSystem),
            passport: Box::new(NoopPassport),
        })
    }

    /// Standard implementations for everything except `requests`.
    pub fn with_requests(requests: impl Requests + 'static) -> Self {
        Self {
            crypto: Box::new(StandardCrypto),
            json: Box::new(StandardJson),
            requests: Box::new(requests),
            logger: Arc::new(ConsoleLogger::stdout()),
            system: Box::new(ThreadSystem),
            passport: Box::new(NoopPassport),
        }
    }

    pub fn with_crypto(mut self, crypto: impl Crypto + 'static) -> Self {
        self.crypto = Box::new(crypto);
        self
    }

    pub fn with_json(mut self, json: impl Json + 'static) -> Self {
        self.json = Box::new(json);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.system = Box::new(system);
        self
    }

    pub fn with_passport(mut self, passport: impl PassportHook + 'static) -> Self {
        self.passport = Box::new(passport);
        self
    }
}
