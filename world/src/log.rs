//! Bounded narration log.

use std::collections::VecDeque;

/// Capacity used when no other value is configured.
pub const DEFAULT_LOG_CAPACITY: usize = 12;

/// Append-only log that keeps only the most recent lines.
///
/// Every line is also forwarded to `tracing` at debug level, so the log
/// itself never owns an output sink.
#[derive(Clone, Debug)]
pub struct EventLog {
    capacity: usize,
    entries: VecDeque<String>,
}

impl EventLog {
    /// Creates an empty log holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a line, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "skirmish::narration", "{line}");
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    /// Retained lines in chronological order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained lines.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
