//! Shared helpers for unit tests.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Collects WARN events as `"<message> key=value ..."` lines.
struct WarnCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let mut line = visitor.message;
        for field in visitor.fields {
            line.push(' ');
            line.push_str(&field);
        }
        self.lines.lock().unwrap().push(line);
    }
}

/// Runs `f` with a thread-local subscriber and returns the WARN lines it emitted.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarnCapture {
        lines: Arc::clone(&lines),
    });
    let output = tracing::subscriber::with_default(subscriber, f);
    let captured = lines.lock().unwrap().clone();
    (output, captured)
}
