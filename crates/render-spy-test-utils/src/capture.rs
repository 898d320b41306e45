//! Log capture for assertions on emitted events

use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// Module target
    pub target: String,
    /// Formatted `message` field
    pub message: String,
    /// Remaining fields, formatted, in recording order
    pub fields: Vec<(String, String)>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value.to_string());
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Run `f` with every event on this thread captured
pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: Arc::clone(&events),
        });
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = std::mem::take(&mut *events.lock());
    (result, captured)
}

/// Run `f` and return the messages of the warnings it emitted
pub fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let (result, events) = capture_events(f);
    let warnings = events
        .into_iter()
        .filter(|e| e.level == Level::WARN)
        .map(|e| e.message)
        .collect();
    (result, warnings)
}

/// Install a test-writer `fmt` subscriber honoring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_warnings_only() {
        let (value, warnings) = capture_warnings(|| {
            tracing::debug!("ignored");
            tracing::warn!(count = 2, "watch out");
            7
        });
        assert_eq!(value, 7);
        assert_eq!(warnings, vec!["watch out".to_string()]);
    }

    #[test]
    fn captures_fields() {
        let ((), events) = capture_events(|| tracing::info!(method = "find", captured = 3u64, "op"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "op");
        assert_eq!(
            events[0].fields,
            vec![
                ("method".to_string(), "find".to_string()),
                ("captured".to_string(), "3".to_string())
            ]
        );
    }
}
