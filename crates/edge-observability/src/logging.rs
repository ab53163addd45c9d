//! Logger collaborator for the cache.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Log level for cache log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Warn,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Warn => write!(f, "WARN"),
        }
    }
}

/// A single recorded log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        format!("[{}] {}", self.level, self.message)
    }
}

/// Sink for the cache's operator-facing lines.
///
/// Trace lines go to `debug`; degraded-but-recovered conditions (a corrupt
/// stored payload, a failed write) go to `warn`.
pub trait CacheLogger: Send + Sync {
    /// Log a debug line.
    fn debug(&self, line: &str);

    /// Log a warning.
    fn warn(&self, line: &str);
}

impl<L: CacheLogger + ?Sized> CacheLogger for Arc<L> {
    fn debug(&self, line: &str) {
        (**self).debug(line);
    }

    fn warn(&self, line: &str) {
        (**self).warn(line);
    }
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl CacheLogger for NullLogger {
    fn debug(&self, _line: &str) {}

    fn warn(&self, _line: &str) {}
}

/// Logger that forwards to the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl CacheLogger for TracingLogger {
    fn debug(&self, line: &str) {
        tracing::debug!(target: "edge_cache", "{}", line);
    }

    fn warn(&self, line: &str) {
        tracing::warn!(target: "edge_cache", "{}", line);
    }
}

/// Logger that keeps every line in memory.
///
/// Clones share the same buffer, so a clone can be handed to the cache while
/// the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLogger {
    /// Create an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages recorded at a given level, oldest first.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Recorded debug messages.
    pub fn debug_lines(&self) -> Vec<String> {
        self.messages(LogLevel::Debug)
    }

    /// Recorded warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warn)
    }

    /// Drop every recorded entry.
    pub fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn record(&self, level: LogLevel, message: &str) {
        let entry = LogEntry {
            level,
            message: message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl CacheLogger for RecordingLogger {
    fn debug(&self, line: &str) {
        self.record(LogLevel::Debug, line);
    }

    fn warn(&self, line: &str) {
        self.record(LogLevel::Warn, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_keeps_order_and_level() {
        let logger = RecordingLogger::new();
        logger.debug("one");
        logger.warn("two");
        logger.debug("three");

        assert_eq!(logger.debug_lines(), vec!["one", "three"]);
        assert_eq!(logger.warnings(), vec!["two"]);
        assert_eq!(logger.entries().len(), 3);
    }

    #[test]
    fn test_recording_logger_clones_share_buffer() {
        let logger = RecordingLogger::new();
        let handle = logger.clone();
        handle.debug("from clone");

        assert_eq!(logger.debug_lines(), vec!["from clone"]);
        logger.clear();
        assert!(handle.entries().is_empty());
    }

    #[test]
    fn test_log_entry_formats() {
        let entry = LogEntry {
            level: LogLevel::Warn,
            message: "disk full".to_string(),
        };
        assert_eq!(entry.to_human(), "[WARN] disk full");
        assert_eq!(entry.to_json(), r#"{"level":"warn","message":"disk full"}"#);
    }

    #[test]
    fn test_null_logger_is_silent() {
        let logger: Arc<dyn CacheLogger> = Arc::new(NullLogger);
        logger.debug("ignored");
        logger.warn("ignored");
    }

    #[test]
    fn test_tracing_logger_without_subscriber() {
        TracingLogger.debug("no subscriber installed");
        TracingLogger.warn("still fine");
    }
}
