//! Logger capability and its sinks.
//!
//! Each call joins its items with single spaces into one line. The console
//! sink prefixes lines by kind, the tracing sink turns them into events and
//! the memory sink records them for inspection.

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The four logging severities a host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Operation,
    Info,
    Failed,
    Succeed,
}

impl LogKind {
    pub const ALL: [LogKind; 4] = [Self::Operation, Self::Info, Self::Failed, Self::Succeed];

    /// Console line prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Operation => "[*]",
            Self::Info => "[=]",
            Self::Failed => "[-]",
            Self::Succeed => "[+]",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::Info => "info",
            Self::Failed => "failed",
            Self::Succeed => "succeed",
        }
    }
}

pub trait Logger: Send + Sync {
    /// Write one already-joined line.
    fn emit(&self, kind: LogKind, line: &str);

    fn operation(&self, items: &[&dyn Display]) {
        self.emit(LogKind::Operation, &join_items(items));
    }

    fn info(&self, items: &[&dyn Display]) {
        self.emit(LogKind::Info, &join_items(items));
    }

    /// May be called with no items.
    fn failed(&self, items: &[&dyn Display]) {
        self.emit(LogKind::Failed, &join_items(items));
    }

    fn succeed(&self, items: &[&dyn Display]) {
        self.emit(LogKind::Succeed, &join_items(items));
    }
}

pub fn join_items(items: &[&dyn Display]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Log through a [`Logger`] with any number of `Display` items.
///
/// ```
/// use capprobe::capability::{Logger, MemoryLogger};
/// use capprobe::cap_log;
///
/// let logger = MemoryLogger::new();
/// cap_log!(logger, info, "crypto.md5", 42);
/// assert_eq!(logger.lines(), vec!["crypto.md5 42".to_string()]);
/// ```
#[macro_export]
macro_rules! cap_log {
    ($logger:expr, $kind:ident) => {{
        use $crate::capability::Logger as _;
        $logger.$kind(&[])
    }};
    ($logger:expr, $kind:ident, $($item:expr),+ $(,)?) => {{
        use $crate::capability::Logger as _;
        $logger.$kind(&[$(&$item as &dyn ::std::fmt::Display),+])
    }};
}

/// Writes prefixed lines such as `[+] done` to a writer (stdout by default).
pub struct ConsoleLogger {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleLogger {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Logger for ConsoleLogger {
    fn emit(&self, kind: LogKind, line: &str) {
        let mut out = self.out.lock();
        // A closed stdout must not abort the checklist.
        if let Err(e) = writeln!(out, "{} {}", kind.prefix(), line).and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "Console logger write failed");
        }
    }
}

/// Forwards lines to `tracing` events. Failures are warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn emit(&self, kind: LogKind, line: &str) {
        match kind {
            LogKind::Failed => tracing::warn!(kind = kind.as_str(), "{}", line),
            _ => tracing::info!(kind = kind.as_str(), "{}", line),
        }
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogKind, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogKind, String)> {
        self.entries.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    pub fn lines_of(&self, kind: LogKind) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Logger for MemoryLogger {
    fn emit(&self, kind: LogKind, line: &str) {
        self.entries.lock().push((kind, line.to_string()));
    }
}

/// Which logger sink a run reports through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerSink {
    #[default]
    Console,
    Tracing,
}

impl LoggerSink {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Tracing => "tracing",
        }
    }
}

impl fmt::Display for LoggerSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerSink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "tracing" => Ok(Self::Tracing),
            other => Err(format!("unknown logger sink: {}", other)),
        }
    }
}
