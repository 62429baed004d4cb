//! Status messages
//!
//! Core operations report human-readable status lines through a [`StatusLog`].
//! They only classify severity; presentation belongs to the implementation.
//! [`ConsoleLog`] prints colored lines for the CLI, [`MemoryLog`] keeps them for
//! inspection. Every message is also forwarded to `tracing`.

use std::sync::Mutex;

use colored::Colorize;

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Receiver of status messages
pub trait StatusLog: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

fn trace(severity: Severity, message: &str) {
    match severity {
        Severity::Info => tracing::info!("{message}"),
        Severity::Warning => tracing::warn!("{message}"),
        Severity::Error => tracing::error!("{message}"),
    }
}

/// Terminal output; `quiet` hides informational lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLog {
    quiet: bool,
}

impl ConsoleLog {
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl StatusLog for ConsoleLog {
    fn log(&self, severity: Severity, message: &str) {
        trace(severity, message);
        match severity {
            Severity::Info if !self.quiet => println!("{message}"),
            Severity::Info => {}
            Severity::Warning => eprintln!("{} {message}", "⚠".yellow()),
            Severity::Error => eprintln!("{} {message}", "✗".red()),
        }
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    #[must_use]
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Messages of one severity
    #[must_use]
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }
}

impl StatusLog for MemoryLog {
    fn log(&self, severity: Severity, message: &str) {
        trace(severity, message);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((severity, message.to_string()));
        }
    }
}
