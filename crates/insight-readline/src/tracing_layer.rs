//! Tracing layer that streams pipeline events to the REPL.
//!
//! Events under the `insight::` target prefix are captured and forwarded
//! through a tokio channel so the shell can print an activity feed.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

const TARGET_PREFIX: &str = "insight::";

/// One captured event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineEvent {
    /// Event target (e.g., "insight::pipeline")
    pub target: String,
    pub level: String,
    pub message: String,
    /// Structured fields other than `message`
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

impl PipelineEvent {
    /// One-line summary, fields sorted by name.
    pub fn summary(&self) -> String {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let rendered: Vec<String> = fields
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}={s}"),
                other => format!("{key}={other}"),
            })
            .collect();

        if rendered.is_empty() {
            format!("{} {}", self.level, self.message)
        } else {
            format!("{} {} ({})", self.level, self.message, rendered.join(", "))
        }
    }
}

/// A tracing layer that sends pipeline events to a channel.
pub struct PipelineEventLayer {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl PipelineEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for PipelineEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with(TARGET_PREFIX) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let pipeline_event = PipelineEvent {
            target: target.to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means the shell is shutting down.
        let _ = self.sender.send(pipeline_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(emit: impl FnOnce()) -> Vec<PipelineEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(PipelineEventLayer::new(tx));
        tracing::subscriber::with_default(subscriber, emit);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_captures_pipeline_events_with_fields() {
        let events = capture(|| {
            tracing::info!(target: "insight::pipeline", sequence = 3u64, query = %"sales", "Query submitted");
        });

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.target, "insight::pipeline");
        assert_eq!(event.level, "INFO");
        assert_eq!(event.message, "Query submitted");
        assert_eq!(event.fields.get("sequence"), Some(&serde_json::json!(3)));
        assert_eq!(event.summary(), "INFO Query submitted (query=sales, sequence=3)");
    }

    #[test]
    fn test_ignores_foreign_targets() {
        let events = capture(|| {
            tracing::warn!(target: "rustyline", "noise");
            tracing::warn!("also noise");
        });
        assert!(events.is_empty());
    }
}
