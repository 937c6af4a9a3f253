use serde_json::json;

use crate::logging::{LogLevel, Logger, event_with_fields, json_kv, json_str};

use super::events::{PlaygroundEvent, PlaygroundObserver};

/// Logs playground lifecycle events for observability/debugging.
pub struct LifecycleLoggerObserver {
    logger: Logger,
    level: LogLevel,
    log_messages: bool,
    log_scheduling: bool,
}

impl LifecycleLoggerObserver {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
            log_messages: false,
            log_scheduling: false,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Log every delivered or dropped control change.
    pub fn log_messages(mut self, enabled: bool) -> Self {
        self.log_messages = enabled;
        self
    }

    /// Log every debounced rebuild that gets scheduled.
    pub fn log_scheduling(mut self, enabled: bool) -> Self {
        self.log_scheduling = enabled;
        self
    }

    fn emit(&self, event: &PlaygroundEvent, extra: impl IntoIterator<Item = (String, serde_json::Value)>) {
        let fields = std::iter::once(json_str("playground_id", event.playground_id())).chain(extra);
        let message = format!("event.{}", event.name());
        let event = event_with_fields(self.level, "playground::runtime.lifecycle", &message, fields);
        let _ = self.logger.log_event(event);
    }
}

impl PlaygroundObserver for LifecycleLoggerObserver {
    fn notify(&self, event: &PlaygroundEvent) {
        match event {
            PlaygroundEvent::TabActivated { tab, .. } => {
                self.emit(event, [json_str("tab", tab.as_str())]);
            }
            PlaygroundEvent::RebuildScheduled { due, .. } if self.log_scheduling => {
                self.emit(event, [json_kv("due_ms", json!(due.as_millis() as u64))]);
            }
            PlaygroundEvent::RebuildScheduled { .. } => {}
            PlaygroundEvent::Rebuilt { fingerprint, .. } => {
                self.emit(event, [json_str("fingerprint", fingerprint.as_str())]);
            }
            PlaygroundEvent::FullscreenToggled { entering, .. } => {
                self.emit(event, [json_kv("entering", json!(entering))]);
            }
            PlaygroundEvent::MessageDelivered { control_id, .. } if self.log_messages => {
                self.emit(event, [json_str("control_id", control_id.as_str())]);
            }
            PlaygroundEvent::MessageDropped {
                control_id, reason, ..
            } if self.log_messages => {
                self.emit(
                    event,
                    [
                        json_str("control_id", control_id.as_str()),
                        json_str("reason", reason.as_str()),
                    ],
                );
            }
            PlaygroundEvent::MessageDelivered { .. } | PlaygroundEvent::MessageDropped { .. } => {}
            _ => self.emit(event, std::iter::empty()),
        }
    }
}
