//! Pipeline run log.
//!
//! Every stage reports progress through the functions here. Entries are
//! printed to stderr (stdout is kept for data) and broadcast so an embedding caller (or a test) can
//! observe a run, e.g. to pick up the row-count warning.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to every subscriber
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Print a log entry to stderr and send it to all subscribers
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(entry.indent as usize);
        eprintln!("{}{} {}", indent, prefix, entry.message);

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for the entries logged from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_indent(indent));
}

/// Drain whatever a receiver has buffered, skipping over lag gaps.
pub fn drain(rx: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    use broadcast::error::TryRecvError;

    let mut entries = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_broadcaster_delivers_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::warning("row counts differ").with_indent(1));
        broadcaster.log(LogEntry::success("done"));

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warning);
        assert_eq!(entries[0].indent, 1);
        assert_eq!(entries[1].message, "done");
    }

    #[test]
    fn test_log_without_subscribers_does_not_fail() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.log(LogEntry::info("nobody listening"));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(LogEntry::error("boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["indent"], 0);
    }
}
