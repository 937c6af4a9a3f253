//! Notifications the runtime publishes to host code.
//!
//! Observers are registered on the runtime up front and receive every event
//! synchronously, in emission order. Delivery is fire-and-forget: an observer
//! cannot veto or answer an event.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Why a control change never reached the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownPlayground,
    /// No preview surface, or the host dropped it, or it has no window.
    NoWindow,
    /// The preview is loading or still inside its settle delay.
    NotReady,
    /// The host rejected the post.
    DeliveryFailed,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::UnknownPlayground => "unknown_playground",
            DropReason::NoWindow => "no_window",
            DropReason::NotReady => "not_ready",
            DropReason::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Outcome of a single send. Dropped messages are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped(DropReason),
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Events published by the playground runtime. Every variant carries the
/// playground identifier it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaygroundEvent {
    Initialized { playground_id: String },
    /// A second container with the same id replaced an existing instance.
    Replaced { playground_id: String },
    Unregistered { playground_id: String },
    TabActivated { playground_id: String, tab: String },
    /// The preview was reset. Hosts typically clear displayed control values.
    Reset { playground_id: String },
    RebuildScheduled { playground_id: String, due: Duration },
    Rebuilt { playground_id: String, fingerprint: String },
    Ready { playground_id: String },
    FullscreenToggled { playground_id: String, entering: bool },
    MessageDelivered { playground_id: String, control_id: String },
    MessageDropped { playground_id: String, control_id: String, reason: DropReason },
}

impl PlaygroundEvent {
    pub fn playground_id(&self) -> &str {
        match self {
            PlaygroundEvent::Initialized { playground_id }
            | PlaygroundEvent::Replaced { playground_id }
            | PlaygroundEvent::Unregistered { playground_id }
            | PlaygroundEvent::TabActivated { playground_id, .. }
            | PlaygroundEvent::Reset { playground_id }
            | PlaygroundEvent::RebuildScheduled { playground_id, .. }
            | PlaygroundEvent::Rebuilt { playground_id, .. }
            | PlaygroundEvent::Ready { playground_id }
            | PlaygroundEvent::FullscreenToggled { playground_id, .. }
            | PlaygroundEvent::MessageDelivered { playground_id, .. }
            | PlaygroundEvent::MessageDropped { playground_id, .. } => playground_id,
        }
    }

    /// Stable snake_case name, used as the log message.
    pub fn name(&self) -> &'static str {
        match self {
            PlaygroundEvent::Initialized { .. } => "initialized",
            PlaygroundEvent::Replaced { .. } => "replaced",
            PlaygroundEvent::Unregistered { .. } => "unregistered",
            PlaygroundEvent::TabActivated { .. } => "tab_activated",
            PlaygroundEvent::Reset { .. } => "reset",
            PlaygroundEvent::RebuildScheduled { .. } => "rebuild_scheduled",
            PlaygroundEvent::Rebuilt { .. } => "rebuilt",
            PlaygroundEvent::Ready { .. } => "ready",
            PlaygroundEvent::FullscreenToggled { .. } => "fullscreen_toggled",
            PlaygroundEvent::MessageDelivered { .. } => "message_delivered",
            PlaygroundEvent::MessageDropped { .. } => "message_dropped",
        }
    }
}

/// Receiver of runtime events.
pub trait PlaygroundObserver {
    fn notify(&self, event: &PlaygroundEvent);
}

impl<F> PlaygroundObserver for F
where
    F: Fn(&PlaygroundEvent),
{
    fn notify(&self, event: &PlaygroundEvent) {
        self(event)
    }
}

/// Buffers every event. Clones share the buffer.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<PlaygroundEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlaygroundEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl PlaygroundObserver for RecordingObserver {
    fn notify(&self, event: &PlaygroundEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closures_observe_events() {
        let resets = Rc::new(Cell::new(0));
        let counter = Rc::clone(&resets);
        let observer = move |event: &PlaygroundEvent| {
            if matches!(event, PlaygroundEvent::Reset { .. }) {
                counter.set(counter.get() + 1);
            }
        };
        observer.notify(&PlaygroundEvent::Reset { playground_id: "a".into() });
        observer.notify(&PlaygroundEvent::Ready { playground_id: "a".into() });
        assert_eq!(resets.get(), 1);
    }

    #[test]
    fn recorder_shares_buffer_between_clones() {
        let recorder = RecordingObserver::new();
        let handle = recorder.clone();
        recorder.notify(&PlaygroundEvent::Initialized { playground_id: "p".into() });
        assert_eq!(handle.count("initialized"), 1);
        assert_eq!(handle.events()[0].playground_id(), "p");
    }
}
