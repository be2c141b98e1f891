//! Event log: append-only record of every state-changing action.
//!
//! Purely observational — no control-flow decision ever reads it. The log
//! viewer renders entries directly; each append also emits a `tracing`
//! event so the structured log stream sees the same history. Unbounded
//! except by process memory.

#[cfg(test)]
#[path = "log_test.rs"]
mod log_test;

use std::time::{SystemTime, UNIX_EPOCH};

/// One recorded canvas event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Unix milliseconds at append time.
    pub ts: i64,
    /// Event name, `component:action` style (e.g. `"post:create"`).
    pub event: String,
    /// Originating component (`"registry"`, `"sync"`, `"snapshot"`, ...).
    pub context: String,
    /// Freeform event payload.
    pub data: serde_json::Value,
}

/// Append-only ordered event sink.
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an entry, stamping it with the current time.
    pub fn record(&mut self, event: &str, context: &str, data: serde_json::Value) {
        tracing::debug!(event, context, %data, "canvas event");
        self.entries.push(LogEntry {
            ts: now_ms(),
            event: event.to_owned(),
            context: context.to_owned(),
            data,
        });
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Current unix time in milliseconds.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}
