//! Process-wide registry of document-level event listeners.
//!
//! Several UI runtimes register their top-level document listeners exactly
//! once per process lifetime, guarded so a second registration is a no-op.
//! The harness tears the document down for every mount, so without replay a
//! component would silently stop dispatching events from the second mount
//! on. The registry records every registration it observes and replays the
//! full list, in original order, onto each new sandbox document.

use crate::dom::{Document, Handler};

#[derive(Debug, Clone)]
pub struct ListenerRecord {
    pub event: String,
    pub handler: Handler,
}

/// Append-only, run-scoped. Records are never removed and registration
/// order is preserved — some runtimes depend on it.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    records: Vec<ListenerRecord>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &str, handler: Handler) {
        self.records.push(ListenerRecord {
            event: event.to_string(),
            handler,
        });
    }

    /// Replay every record onto `document` through the native registration,
    /// in original order. An empty registry is a valid no-op, not an error.
    pub fn restore(&self, document: &mut Document) {
        for record in &self.records {
            document.add_event_listener(&record.event, record.handler.clone());
        }
    }

    pub fn records(&self) -> &[ListenerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decorator over the native registration entry point: forwards every call
/// to `Document::add_event_listener` and additionally appends a record.
/// The sandbox routes its listener entry point through this wrapper, so
/// every registration — from the runtime, from component code, from
/// anywhere — is observed.
pub struct RecordingRegistrar<'a> {
    registry: &'a mut ListenerRegistry,
}

impl<'a> RecordingRegistrar<'a> {
    pub fn new(registry: &'a mut ListenerRegistry) -> Self {
        Self { registry }
    }

    pub fn register(&mut self, document: &mut Document, event: &str, handler: Handler) {
        self.registry.record(event, handler.clone());
        document.add_event_listener(event, handler);
    }
}
