//! Capturing `tracing` output in tests.
//!
//! Install with [`capture_logs`] on a current-thread runtime (the default for
//! `#[tokio::test]`): the guard sets a thread-local default subscriber, so
//! spawned effect tasks log into the same capture.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Event level
    pub level: Level,
    /// Module path the event came from
    pub target: String,
    /// The `message` field
    pub message: String,
    /// Every other field, formatted with `Debug`
    pub fields: BTreeMap<String, String>,
}

impl LogRecord {
    /// Value of a field, if recorded
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(field.name().to_string(), format!("{value:?}"));
        }
    }
}

/// Shared view of everything a [`LogCapture`] recorded
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CapturedLogs {
    /// Every record so far
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Records at exactly `level`
    #[must_use]
    pub fn at(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    /// Records at `ERROR`
    #[must_use]
    pub fn errors(&self) -> Vec<LogRecord> {
        self.at(Level::ERROR)
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// `tracing_subscriber` layer that stores events in memory
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    logs: CapturedLogs,
}

impl LogCapture {
    /// A layer and the handle to read what it captures
    #[must_use]
    pub fn new() -> (Self, CapturedLogs) {
        let capture = Self::default();
        let logs = capture.logs.clone();
        (capture, logs)
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let record = LogRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        };
        self.logs
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Capture every event on this thread until the guard is dropped
#[must_use]
pub fn capture_logs() -> (DefaultGuard, CapturedLogs) {
    let (layer, logs) = LogCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    (tracing::subscriber::set_default(subscriber), logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_message_and_fields() {
        let (_guard, logs) = capture_logs();

        tracing::error!(kind = "fetch-error", error = %"boom", "fetch failed");
        tracing::info!("ignored by errors()");

        let errors = logs.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "fetch failed");
        assert_eq!(errors[0].field("kind"), Some("fetch-error"));
        assert_eq!(errors[0].field("error"), Some("boom"));
        assert_eq!(logs.records().len(), 2);
    }

    #[test]
    fn clear_forgets_records() {
        let (_guard, logs) = capture_logs();
        tracing::warn!("first");
        logs.clear();
        assert!(logs.records().is_empty());
    }
}
