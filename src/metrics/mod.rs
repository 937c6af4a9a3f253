use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by the playground runtime.
#[derive(Debug, Default, Clone)]
pub struct RuntimeMetrics {
    edits: u64,
    rebuilds: u64,
    resets: u64,
    delivered: u64,
    dropped: u64,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_edit(&mut self) {
        self.edits = self.edits.saturating_add(1);
    }

    pub fn record_rebuild(&mut self) {
        self.rebuilds = self.rebuilds.saturating_add(1);
    }

    pub fn record_reset(&mut self) {
        self.resets = self.resets.saturating_add(1);
    }

    pub fn record_delivery(&mut self, delivered: bool) {
        if delivered {
            self.delivered = self.delivered.saturating_add(1);
        } else {
            self.dropped = self.dropped.saturating_add(1);
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            edits: self.edits,
            rebuilds: self.rebuilds,
            resets: self.resets,
            messages_delivered: self.delivered,
            messages_dropped: self.dropped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub edits: u64,
    pub rebuilds: u64,
    pub resets: u64,
    pub messages_delivered: u64,
    pub messages_dropped: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "runtime_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("edits".to_string(), json!(self.edits));
        map.insert("rebuilds".to_string(), json!(self.rebuilds));
        map.insert("resets".to_string(), json!(self.resets));
        map.insert("messages_delivered".to_string(), json!(self.messages_delivered));
        map.insert("messages_dropped".to_string(), json!(self.messages_dropped));
        map
    }
}
