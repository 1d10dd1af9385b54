//! Host-facing log channels
//!
//! The registry reports engine-level events through a [`LogSink`] injected at
//! construction. Hosts usually route the three channels into their own console;
//! Rust callers get [`LogFacade`], which forwards to the `log` crate.

use std::sync::Mutex;

/// Three one-way notification channels. Calls are fire-and-forget.
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards every channel to the `log` facade under the `soundslot` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn info(&self, message: &str) {
        log::info!(target: "soundslot", "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "soundslot", "{}", message);
    }

    fn error(&self, message: &str) {
        log::error!(target: "soundslot", "{}", message);
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Severity of a captured message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Captures messages in memory
///
/// Useful for hosts that poll for diagnostics instead of registering
/// callbacks, and for asserting on engine messages in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every captured message in arrival order
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages captured on a single channel
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// True if any message on `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn push(&self, level: LogLevel, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((level, message.to_string()));
    }
}

impl LogSink for MemorySink {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_separates_channels() {
        let sink = MemorySink::new();
        sink.info("loaded");
        sink.warn("stale handle");
        sink.error("engine failed");

        assert_eq!(sink.messages(LogLevel::Info), vec!["loaded".to_string()]);
        assert!(sink.contains(LogLevel::Warn, "stale"));
        assert!(sink.contains(LogLevel::Error, "engine"));
        assert!(!sink.contains(LogLevel::Info, "engine"));
    }

    #[test]
    fn test_memory_sink_clear() {
        let sink = MemorySink::new();
        sink.error("boom");
        sink.clear();
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_null_and_facade_are_silent_noops() {
        // Nothing to assert beyond "does not panic without a logger installed"
        NullSink.error("ignored");
        LogFacade.info("ignored");
    }
}
