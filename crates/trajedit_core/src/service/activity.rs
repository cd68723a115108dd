//! Human-readable activity log sinks.
//!
//! # Responsibility
//! - Receive one message per editor event (load, move, delete, undo, save).
//! - Stay observational: sinks never influence editor state.

/// Append-only receiver for editor event messages.
pub trait ActivitySink {
    fn record(&mut self, message: String);
}

/// In-memory activity log backing an on-screen log view.
#[derive(Debug, Default, Clone)]
pub struct MemoryActivityLog {
    entries: Vec<String>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

impl ActivitySink for MemoryActivityLog {
    fn record(&mut self, message: String) {
        self.entries.push(message);
    }
}
