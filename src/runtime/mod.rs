use std::ops::Range;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::document::{self, DocumentOptions, D3_SCRIPT_URL};
use crate::host::{PanelKind, PlaygroundConfig, PlaygroundContainer, PreviewSurface};
use crate::logging::{event_with_fields, json_kv, json_str};
use crate::protocol::{ControlChangeMessage, ControlValue, PreviewMessage, TARGET_ORIGIN};
use crate::registry::{PlaygroundInstance, PlaygroundRegistry, PlaygroundState};
use crate::{LogLevel, Logger, PlaygroundError, Result, RuntimeMetrics};

pub mod diagnostics;
pub mod events;
pub mod scheduler;

use self::events::{Delivery, DropReason, PlaygroundEvent, PlaygroundObserver};
use self::scheduler::{Scheduler, TaskHandle};

const RUNTIME_TARGET: &str = "playground::runtime";

/// Spaces inserted in place of a tab keypress.
pub const INDENT: &str = "  ";

/// Configuration knobs for the playground runtime.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Quiet period after the last edit before the preview is rebuilt.
    pub debounce: Duration,
    /// Delay between the preview's load signal and it being treated as ready.
    pub settle_delay: Duration,
    /// Optional structured logger used by the runtime.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<RuntimeMetrics>>>,
    /// Interval of host time between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
    /// External scripts loaded into the head of every preview document.
    pub library_scripts: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            settle_delay: Duration::from_millis(200),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "playground::runtime.metrics".to_string(),
            library_scripts: vec![D3_SCRIPT_URL.to_string()],
        }
    }
}

impl RuntimeConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(RuntimeMetrics::new())));
        }
    }

    /// Disable metrics collection and prevent further snapshots.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<RuntimeMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    fn document_options(&self, config: &PlaygroundConfig) -> DocumentOptions {
        DocumentOptions {
            show_grid: config.show_grid,
            grid_size: config.grid_size,
            library_scripts: self.library_scripts.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScheduledTask {
    Rebuild { playground_id: String },
    Settle { playground_id: String },
}

/// Drives every playground on a page.
///
/// The runtime owns the registry and a host-driven clock. Hosts forward user
/// interactions (`edit`, `reset`, `activate_tab`, ...) and preview load
/// signals, and call [`PlaygroundRuntime::advance`] as time passes so debounced
/// rebuilds and settle delays fire.
pub struct PlaygroundRuntime {
    registry: PlaygroundRegistry,
    scheduler: Scheduler<ScheduledTask>,
    config: RuntimeConfig,
    observers: Vec<Box<dyn PlaygroundObserver>>,
    last_metrics_emit: Option<Duration>,
}

impl Default for PlaygroundRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaygroundRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut runtime = Self {
            registry: PlaygroundRegistry::new(),
            scheduler: Scheduler::new(),
            config,
            observers: Vec::new(),
            last_metrics_emit: None,
        };
        runtime.ensure_metrics_initialized();
        runtime
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    pub fn register_observer<O>(&mut self, observer: O)
    where
        O: PlaygroundObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn registry(&self) -> &PlaygroundRegistry {
        &self.registry
    }

    pub fn instance(&self, playground_id: &str) -> Option<&PlaygroundInstance> {
        self.registry.get(playground_id)
    }

    pub fn state(&self, playground_id: &str) -> Option<PlaygroundState> {
        self.registry.get(playground_id).map(PlaygroundInstance::state)
    }

    pub fn is_ready(&self, playground_id: &str) -> bool {
        self.registry
            .get(playground_id)
            .is_some_and(PlaygroundInstance::is_ready)
    }

    /// Current host time as seen by the runtime.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Deadline of the next scheduled rebuild or settle, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Register a rendered container and return its identifier.
    ///
    /// A container without an identifier is logged and rejected. Registering
    /// an identifier twice replaces the earlier instance and cancels its
    /// pending tasks.
    pub fn initialize<C>(&mut self, container: &C) -> Result<String>
    where
        C: PlaygroundContainer + ?Sized,
    {
        let config = match PlaygroundConfig::from_attributes(container) {
            Ok(config) => config,
            Err(err) => {
                self.log_runtime_event(
                    LogLevel::Error,
                    "initialize_failed",
                    [json_str("error", err.to_string())],
                );
                return Err(err);
            }
        };

        let panels = PanelKind::ALL
            .into_iter()
            .filter_map(|kind| container.panel_text(kind).map(|text| (kind, text)))
            .collect();
        let instance = PlaygroundInstance::new(config, container.preview(), panels, container.tabs());
        let id = instance.id().to_string();
        let fields = [
            json_str("playground_id", id.as_str()),
            json_kv("editable", json!(instance.is_editable())),
            json_kv("tabs", json!(instance.tabs().len())),
            json_kv("has_preview", json!(instance.has_preview())),
        ];
        let loaded = instance.preview().is_some_and(|surface| surface.is_loaded());

        if let Some(mut replaced) = self.registry.register(instance) {
            self.cancel_tasks(&mut replaced);
            self.log_runtime_event(
                LogLevel::Warn,
                "duplicate_playground_id",
                [json_str("playground_id", id.as_str())],
            );
            self.notify(PlaygroundEvent::Replaced {
                playground_id: id.clone(),
            });
        }

        self.log_runtime_event(LogLevel::Info, "playground_initialized", fields);
        self.notify(PlaygroundEvent::Initialized {
            playground_id: id.clone(),
        });

        if loaded {
            self.arm_settle(&id);
        }
        Ok(id)
    }

    /// Remove a playground and cancel its pending tasks.
    pub fn unregister(&mut self, playground_id: &str) -> bool {
        let Some(mut instance) = self.registry.unregister(playground_id) else {
            return false;
        };
        self.cancel_tasks(&mut instance);
        self.log_runtime_event(
            LogLevel::Info,
            "playground_unregistered",
            [json_str("playground_id", playground_id)],
        );
        self.notify(PlaygroundEvent::Unregistered {
            playground_id: playground_id.to_string(),
        });
        true
    }

    /// Activate one tab; every sibling becomes inactive.
    pub fn activate_tab(&mut self, playground_id: &str, tab: &str) -> Result<()> {
        let instance = self.instance_mut(playground_id)?;
        if !instance.activate_tab(tab) {
            return Err(PlaygroundError::UnknownTab {
                playground: playground_id.to_string(),
                tab: tab.to_string(),
            });
        }
        self.notify(PlaygroundEvent::TabActivated {
            playground_id: playground_id.to_string(),
            tab: tab.to_string(),
        });
        Ok(())
    }

    /// Reload the preview and broadcast a reset notification.
    ///
    /// Pending rebuild and settle tasks are cancelled and the instance returns
    /// to `Initialized`. Readiness drops until the next load signal settles.
    /// The notification goes out even when there is no live preview to reload.
    pub fn reset(&mut self, playground_id: &str) -> Result<()> {
        let instance = self.instance_mut(playground_id)?;
        let cancelled = instance.take_pending_tasks();
        instance.state = PlaygroundState::Initialized;
        if let Some(surface) = instance.preview().filter(|surface| surface.has_window()) {
            surface.reload();
            instance.preview_ready = false;
        }
        for handle in cancelled {
            self.scheduler.cancel(handle);
        }

        self.record_metric(RuntimeMetrics::record_reset);
        self.log_runtime_event(
            LogLevel::Info,
            "playground_reset",
            [json_str("playground_id", playground_id)],
        );
        self.notify(PlaygroundEvent::Reset {
            playground_id: playground_id.to_string(),
        });
        Ok(())
    }

    /// Leave fullscreen when the preview is fullscreen, otherwise request it.
    ///
    /// Returns whether the preview is entering fullscreen. A rejected request
    /// is logged and returned; nothing else changes.
    pub fn toggle_fullscreen(&mut self, playground_id: &str) -> Result<bool> {
        let surface = self.live_surface(playground_id)?;
        let entering = if surface.is_fullscreen() {
            surface.exit_fullscreen();
            false
        } else {
            if let Err(err) = surface.request_fullscreen() {
                self.log_runtime_event(
                    LogLevel::Error,
                    "fullscreen_failed",
                    [
                        json_str("playground_id", playground_id),
                        json_str("error", err.to_string()),
                    ],
                );
                return Err(err.into());
            }
            true
        };

        self.notify(PlaygroundEvent::FullscreenToggled {
            playground_id: playground_id.to_string(),
            entering,
        });
        Ok(entering)
    }

    /// Replace a panel's text and (re)start the debounce timer.
    ///
    /// Any rebuild already waiting is cancelled, so a burst of edits produces a
    /// single rebuild with the last text.
    pub fn edit(&mut self, playground_id: &str, panel: PanelKind, text: impl Into<String>) -> Result<()> {
        let debounce = self.config.debounce;
        let instance = self.editable_instance(playground_id)?;
        instance.set_panel_text(panel, text.into());
        let previous = instance.pending_rebuild.take();
        if let Some(handle) = previous {
            self.scheduler.cancel(handle);
        }

        let handle = self.scheduler.schedule(
            debounce,
            ScheduledTask::Rebuild {
                playground_id: playground_id.to_string(),
            },
        );
        let due = self.scheduler.now().saturating_add(debounce);
        if let Some(instance) = self.registry.get_mut(playground_id) {
            instance.pending_rebuild = Some(handle);
            instance.state = PlaygroundState::EditingDebounced;
        }

        self.record_metric(RuntimeMetrics::record_edit);
        self.log_runtime_event(
            LogLevel::Debug,
            "rebuild_scheduled",
            [
                json_str("playground_id", playground_id),
                json_str("panel", panel.as_str()),
                json_kv("due_ms", json!(due.as_millis() as u64)),
                json_kv("superseded", json!(previous.is_some())),
            ],
        );
        self.notify(PlaygroundEvent::RebuildScheduled {
            playground_id: playground_id.to_string(),
            due,
        });
        Ok(())
    }

    /// Replace the selected byte range of a panel with two spaces and return
    /// the caret position after the insertion.
    ///
    /// Mirrors a tab keypress in the editor. Like any programmatic insertion it
    /// does not count as an edit and schedules nothing.
    pub fn insert_indent(
        &mut self,
        playground_id: &str,
        panel: PanelKind,
        selection: Range<usize>,
    ) -> Result<usize> {
        let instance = self.editable_instance(playground_id)?;
        let text = instance.panel_mut(panel);
        let Range { start, end } = selection;
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(PlaygroundError::InvalidSelection {
                start,
                end,
                len: text.len(),
            });
        }
        text.replace_range(start..end, INDENT);
        Ok(start + INDENT.len())
    }

    /// Assemble the panels into a document and install it in the preview.
    ///
    /// Readiness is cleared before the document is installed and only comes
    /// back after the next load signal settles. A pending debounced rebuild is
    /// absorbed by this one.
    pub fn rebuild(&mut self, playground_id: &str) -> Result<()> {
        let instance = self
            .registry
            .get_mut(playground_id)
            .ok_or_else(|| PlaygroundError::UnknownPlayground(playground_id.to_string()))?;
        let mut cancelled = instance.take_pending_tasks();
        instance.preview_ready = false;
        let surface = instance.preview();

        let Some(surface) = surface else {
            for handle in cancelled.drain(..) {
                self.scheduler.cancel(handle);
            }
            self.log_runtime_event(
                LogLevel::Warn,
                "rebuild_skipped",
                [
                    json_str("playground_id", playground_id),
                    json_str("reason", "no_preview"),
                ],
            );
            return Err(PlaygroundError::NoPreview(playground_id.to_string()));
        };

        let js = format!(
            "{}\n\n{}",
            instance.panel_text(PanelKind::Js),
            instance.config.js_controls
        );
        let options = self.config.document_options(&instance.config);
        let doc = document::build(
            instance.panel_text(PanelKind::Html),
            instance.panel_text(PanelKind::Css),
            &js,
            &options,
        );
        let changed = instance.record_document(&doc);
        instance.state = PlaygroundState::Rebuilding;

        for handle in cancelled {
            self.scheduler.cancel(handle);
        }
        surface.set_srcdoc(&doc);

        let fingerprint = document::fingerprint(&doc);
        self.record_metric(RuntimeMetrics::record_rebuild);
        self.log_runtime_event(
            LogLevel::Info,
            "preview_rebuilt",
            [
                json_str("playground_id", playground_id),
                json_str("fingerprint", fingerprint.as_str()),
                json_kv("bytes", json!(doc.len())),
                json_kv("changed", json!(changed)),
            ],
        );
        self.notify(PlaygroundEvent::Rebuilt {
            playground_id: playground_id.to_string(),
            fingerprint,
        });
        Ok(())
    }

    /// The preview fired its load signal. It becomes ready once the settle
    /// delay passes without another reload.
    pub fn preview_loaded(&mut self, playground_id: &str) -> Result<()> {
        self.instance_mut(playground_id)?;
        self.arm_settle(playground_id);
        Ok(())
    }

    /// Forward a control value into the preview.
    ///
    /// Without a live, ready preview the message is dropped with a warning.
    /// Nothing is queued or retried.
    pub fn send_to_preview(
        &mut self,
        playground_id: &str,
        control_id: &str,
        value: impl Into<ControlValue>,
    ) -> Delivery {
        let message = ControlChangeMessage::new(playground_id, control_id, value);
        let delivery = self.deliver(&message);
        self.record_metric(|metrics| metrics.record_delivery(delivery.is_delivered()));

        let event = match delivery {
            Delivery::Delivered => {
                self.log_runtime_event(
                    LogLevel::Debug,
                    "message_delivered",
                    [
                        json_str("playground_id", playground_id),
                        json_str("control_id", control_id),
                        json_str("value", message.value.to_string()),
                    ],
                );
                PlaygroundEvent::MessageDelivered {
                    playground_id: playground_id.to_string(),
                    control_id: control_id.to_string(),
                }
            }
            Delivery::Dropped(reason) => {
                self.log_runtime_event(
                    LogLevel::Warn,
                    "message_dropped",
                    [
                        json_str("playground_id", playground_id),
                        json_str("control_id", control_id),
                        json_str("reason", reason.as_str()),
                    ],
                );
                PlaygroundEvent::MessageDropped {
                    playground_id: playground_id.to_string(),
                    control_id: control_id.to_string(),
                    reason,
                }
            }
        };
        self.notify(event);
        delivery
    }

    /// Route a message to the playground it names.
    pub fn dispatch(&mut self, message: ControlChangeMessage) -> Delivery {
        let ControlChangeMessage {
            control_id,
            value,
            playground_id,
        } = message;
        self.send_to_preview(&playground_id, &control_id, value)
    }

    /// A send capability bound to one playground, for control panels.
    pub fn sender(&mut self, playground_id: &str) -> Option<PreviewSender<'_>> {
        if !self.registry.contains(playground_id) {
            return None;
        }
        Some(PreviewSender {
            runtime: self,
            playground_id: playground_id.to_string(),
        })
    }

    /// Move host time forward, firing every task that falls due in order of
    /// its deadline. Tasks scheduled by a firing task run too when they fall
    /// inside the window.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.scheduler.now().saturating_add(dt);
        while let Some(deadline) = self.scheduler.next_deadline() {
            if deadline > target {
                break;
            }
            self.scheduler.set_clock(deadline);
            while let Some((handle, task)) = self.scheduler.pop_due() {
                self.run_task(handle, task);
            }
        }
        self.scheduler.set_clock(target);
        self.maybe_emit_metrics();
    }

    fn run_task(&mut self, handle: TaskHandle, task: ScheduledTask) {
        match task {
            ScheduledTask::Rebuild { playground_id } => {
                let Some(instance) = self.registry.get_mut(&playground_id) else {
                    return;
                };
                if instance.pending_rebuild != Some(handle) {
                    return;
                }
                instance.pending_rebuild = None;
                if let Err(err) = self.rebuild(&playground_id) {
                    self.log_runtime_event(
                        LogLevel::Debug,
                        "scheduled_rebuild_failed",
                        [
                            json_str("playground_id", playground_id.as_str()),
                            json_str("error", err.to_string()),
                        ],
                    );
                }
            }
            ScheduledTask::Settle { playground_id } => {
                let Some(instance) = self.registry.get_mut(&playground_id) else {
                    return;
                };
                if instance.pending_settle != Some(handle) {
                    return;
                }
                instance.pending_settle = None;
                instance.preview_ready = true;
                if instance.state == PlaygroundState::Rebuilding {
                    instance.state = PlaygroundState::Initialized;
                }
                self.log_runtime_event(
                    LogLevel::Debug,
                    "preview_ready",
                    [json_str("playground_id", playground_id.as_str())],
                );
                self.notify(PlaygroundEvent::Ready { playground_id });
            }
        }
    }

    fn deliver(&self, message: &ControlChangeMessage) -> Delivery {
        let Some(instance) = self.registry.get(&message.playground_id) else {
            return Delivery::Dropped(DropReason::UnknownPlayground);
        };
        let Some(surface) = instance.preview().filter(|surface| surface.has_window()) else {
            return Delivery::Dropped(DropReason::NoWindow);
        };
        if !instance.is_ready() {
            return Delivery::Dropped(DropReason::NotReady);
        }

        let envelope = PreviewMessage::ControlChange(message.clone());
        match surface.post_message(&envelope, TARGET_ORIGIN) {
            Ok(()) => Delivery::Delivered,
            Err(err) => {
                self.log_runtime_event(
                    LogLevel::Error,
                    "post_message_failed",
                    [
                        json_str("playground_id", message.playground_id.as_str()),
                        json_str("error", err.to_string()),
                    ],
                );
                Delivery::Dropped(DropReason::DeliveryFailed)
            }
        }
    }

    fn arm_settle(&mut self, playground_id: &str) {
        let delay = self.config.settle_delay;
        let Some(instance) = self.registry.get_mut(playground_id) else {
            return;
        };
        let previous = instance.pending_settle.take();
        if let Some(handle) = previous {
            self.scheduler.cancel(handle);
        }
        let handle = self.scheduler.schedule(
            delay,
            ScheduledTask::Settle {
                playground_id: playground_id.to_string(),
            },
        );
        if let Some(instance) = self.registry.get_mut(playground_id) {
            instance.pending_settle = Some(handle);
        }
    }

    fn cancel_tasks(&mut self, instance: &mut PlaygroundInstance) {
        for handle in instance.take_pending_tasks() {
            self.scheduler.cancel(handle);
        }
    }

    fn instance_mut(&mut self, playground_id: &str) -> Result<&mut PlaygroundInstance> {
        self.registry
            .get_mut(playground_id)
            .ok_or_else(|| PlaygroundError::UnknownPlayground(playground_id.to_string()))
    }

    fn editable_instance(&mut self, playground_id: &str) -> Result<&mut PlaygroundInstance> {
        let editable = self.instance_mut(playground_id)?.is_editable();
        if !editable {
            self.log_runtime_event(
                LogLevel::Warn,
                "edit_rejected",
                [json_str("playground_id", playground_id)],
            );
            return Err(PlaygroundError::NotEditable(playground_id.to_string()));
        }
        self.instance_mut(playground_id)
    }

    fn live_surface(&self, playground_id: &str) -> Result<Rc<dyn PreviewSurface>> {
        let instance = self
            .registry
            .get(playground_id)
            .ok_or_else(|| PlaygroundError::UnknownPlayground(playground_id.to_string()))?;
        instance
            .preview()
            .ok_or_else(|| PlaygroundError::NoPreview(playground_id.to_string()))
    }

    fn notify(&self, event: PlaygroundEvent) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && self.config.metrics_interval > Duration::from_millis(0)
        {
            self.config.metrics = Some(Arc::new(Mutex::new(RuntimeMetrics::new())));
        }
    }

    fn log_runtime_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, RUNTIME_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn record_metric(&self, record: impl FnOnce(&mut RuntimeMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() {
            return;
        }

        if self.config.metrics_interval == Duration::from_millis(0) {
            return;
        }

        let now = self.scheduler.now();
        match self.last_metrics_emit {
            Some(last) if now.saturating_sub(last) < self.config.metrics_interval => {
                return;
            }
            None if now < self.config.metrics_interval => {
                return;
            }
            _ => {
                self.last_metrics_emit = Some(now);
            }
        }

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let target = self.config.metrics_target.as_str();
                let snapshot_event = guard.snapshot(now).to_log_event(target);
                let _ = logger.log_event(snapshot_event);
            }
        }
    }
}

/// Send capability bound to one playground.
pub struct PreviewSender<'a> {
    runtime: &'a mut PlaygroundRuntime,
    playground_id: String,
}

impl PreviewSender<'_> {
    pub fn playground_id(&self) -> &str {
        &self.playground_id
    }

    pub fn send(&mut self, control_id: &str, value: impl Into<ControlValue>) -> Delivery {
        self.runtime
            .send_to_preview(&self.playground_id, control_id, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::logging::MemorySink;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Weak;

    #[derive(Default)]
    struct Frame {
        window: Cell<bool>,
        loaded: Cell<bool>,
        fullscreen: Cell<bool>,
        reject_fullscreen: Cell<bool>,
        reloads: Cell<usize>,
        srcdoc: RefCell<Option<String>>,
        posted: RefCell<Vec<PreviewMessage>>,
    }

    impl Frame {
        fn live() -> Rc<Self> {
            let frame = Self::default();
            frame.window.set(true);
            Rc::new(frame)
        }
    }

    impl PreviewSurface for Frame {
        fn has_window(&self) -> bool {
            self.window.get()
        }
        fn is_loaded(&self) -> bool {
            self.loaded.get()
        }
        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
        fn set_srcdoc(&self, document: &str) {
            *self.srcdoc.borrow_mut() = Some(document.to_string());
        }
        fn post_message(&self, message: &PreviewMessage, _origin: &str) -> std::result::Result<(), HostError> {
            self.posted.borrow_mut().push(message.clone());
            Ok(())
        }
        fn is_fullscreen(&self) -> bool {
            self.fullscreen.get()
        }
        fn request_fullscreen(&self) -> std::result::Result<(), HostError> {
            if self.reject_fullscreen.get() {
                return Err(HostError::FullscreenRejected("denied".into()));
            }
            self.fullscreen.set(true);
            Ok(())
        }
        fn exit_fullscreen(&self) {
            self.fullscreen.set(false);
        }
    }

    struct Container {
        attrs: HashMap<String, String>,
        frame: Option<Rc<Frame>>,
    }

    impl crate::host::AttributeSource for Container {
        fn attribute(&self, name: &str) -> Option<String> {
            self.attrs.get(name).cloned()
        }
    }

    impl PlaygroundContainer for Container {
        fn panel_text(&self, panel: PanelKind) -> Option<String> {
            match panel {
                PanelKind::Html => Some("<svg></svg>".into()),
                PanelKind::Css => None,
                PanelKind::Js => Some("draw();".into()),
            }
        }
        fn tabs(&self) -> Vec<String> {
            vec!["html".into(), "js".into()]
        }
        fn preview(&self) -> Option<Weak<dyn PreviewSurface>> {
            self.frame.as_ref().map(|frame| {
                let surface: Rc<dyn PreviewSurface> = frame.clone();
                Rc::downgrade(&surface)
            })
        }
    }

    fn container(id: &str, editable: bool, frame: Option<Rc<Frame>>) -> Container {
        let mut attrs = HashMap::new();
        attrs.insert("data-playground-id".to_string(), id.to_string());
        if editable {
            attrs.insert("data-editable".to_string(), "true".to_string());
        }
        Container { attrs, frame }
    }

    fn runtime_with_logs() -> (PlaygroundRuntime, MemorySink) {
        let sink = MemorySink::new();
        let config = RuntimeConfig {
            logger: Some(Logger::new(sink.clone())),
            ..RuntimeConfig::default()
        };
        (PlaygroundRuntime::with_config(config), sink)
    }

    #[test]
    fn missing_identifier_is_logged_not_registered() {
        let (mut runtime, sink) = runtime_with_logs();
        let bare = Container {
            attrs: HashMap::new(),
            frame: None,
        };
        assert!(matches!(
            runtime.initialize(&bare),
            Err(PlaygroundError::MissingIdentifier)
        ));
        assert!(runtime.registry().is_empty());
        assert_eq!(sink.find(LogLevel::Error, "initialize_failed").len(), 1);
    }

    #[test]
    fn edits_coalesce_into_one_rebuild() {
        let frame = Frame::live();
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", true, Some(frame.clone())))
            .unwrap();

        for i in 0..5 {
            runtime.edit("p", PanelKind::Js, format!("step({i});")).unwrap();
            runtime.advance(Duration::from_millis(100));
        }
        assert!(frame.srcdoc.borrow().is_none());
        assert_eq!(runtime.state("p"), Some(PlaygroundState::EditingDebounced));

        runtime.advance(Duration::from_millis(400));
        let doc = frame.srcdoc.borrow().clone().unwrap();
        assert!(doc.contains("step(4);"));
        assert!(!doc.contains("step(3);"));
        assert_eq!(runtime.state("p"), Some(PlaygroundState::Rebuilding));
    }

    #[test]
    fn non_editable_playground_rejects_edits() {
        let mut runtime = PlaygroundRuntime::new();
        runtime.initialize(&container("p", false, None)).unwrap();
        assert!(matches!(
            runtime.edit("p", PanelKind::Html, "x"),
            Err(PlaygroundError::NotEditable(_))
        ));
    }

    #[test]
    fn readiness_needs_load_plus_settle() {
        let frame = Frame::live();
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", true, Some(frame.clone())))
            .unwrap();
        runtime.rebuild("p").unwrap();
        assert!(!runtime.is_ready("p"));

        runtime.preview_loaded("p").unwrap();
        runtime.advance(Duration::from_millis(199));
        assert!(!runtime.is_ready("p"));
        runtime.advance(Duration::from_millis(1));
        assert!(runtime.is_ready("p"));
        assert_eq!(runtime.state("p"), Some(PlaygroundState::Initialized));
    }

    #[test]
    fn already_loaded_preview_settles_after_initialize() {
        let frame = Frame::live();
        frame.loaded.set(true);
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();
        runtime.advance(Duration::from_millis(200));
        assert!(runtime.is_ready("p"));
    }

    #[test]
    fn send_drops_until_ready() {
        let frame = Frame::live();
        let (mut runtime, sink) = runtime_with_logs();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();

        assert_eq!(
            runtime.send_to_preview("p", "radius", 4.0),
            Delivery::Dropped(DropReason::NotReady)
        );
        assert_eq!(sink.find(LogLevel::Warn, "message_dropped").len(), 1);

        runtime.preview_loaded("p").unwrap();
        runtime.advance(Duration::from_millis(200));
        assert!(runtime.send_to_preview("p", "radius", 5.0).is_delivered());

        let posted = frame.posted.borrow();
        assert_eq!(posted.len(), 1);
        let PreviewMessage::ControlChange(message) = &posted[0];
        assert_eq!(message.value, ControlValue::Number(5.0));
    }

    #[test]
    fn sender_is_bound_to_one_playground() {
        let frame = Frame::live();
        frame.loaded.set(true);
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();
        runtime.advance(Duration::from_millis(200));

        assert!(runtime.sender("missing").is_none());
        let mut sender = runtime.sender("p").unwrap();
        assert!(sender.send("axis", true).is_delivered());
        assert_eq!(frame.posted.borrow().len(), 1);
    }

    #[test]
    fn dropped_preview_counts_as_no_window() {
        let frame = Frame::live();
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();
        drop(frame);
        assert_eq!(
            runtime.send_to_preview("p", "radius", 1.0),
            Delivery::Dropped(DropReason::NoWindow)
        );
        assert!(matches!(
            runtime.rebuild("p"),
            Err(PlaygroundError::NoPreview(_))
        ));
    }

    #[test]
    fn reset_reloads_and_clears_readiness() {
        let frame = Frame::live();
        frame.loaded.set(true);
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();
        runtime.advance(Duration::from_millis(200));
        assert!(runtime.is_ready("p"));

        runtime.reset("p").unwrap();
        assert_eq!(frame.reloads.get(), 1);
        assert!(!runtime.is_ready("p"));
    }

    #[test]
    fn reset_cancels_a_pending_rebuild() {
        let frame = Frame::live();
        let mut runtime = PlaygroundRuntime::new();
        runtime
            .initialize(&container("p", true, Some(frame.clone())))
            .unwrap();

        runtime.edit("p", PanelKind::Js, "x();").unwrap();
        assert_eq!(runtime.state("p"), Some(PlaygroundState::EditingDebounced));
        runtime.reset("p").unwrap();
        assert_eq!(runtime.state("p"), Some(PlaygroundState::Initialized));
        assert!(runtime.next_deadline().is_none());

        runtime.advance(Duration::from_millis(600));
        assert_eq!(frame.reloads.get(), 1);
        assert!(frame.srcdoc.borrow().is_none());
        assert_eq!(runtime.state("p"), Some(PlaygroundState::Initialized));
    }

    #[test]
    fn fullscreen_toggles_and_logs_rejections() {
        let frame = Frame::live();
        let (mut runtime, sink) = runtime_with_logs();
        runtime
            .initialize(&container("p", false, Some(frame.clone())))
            .unwrap();

        assert!(runtime.toggle_fullscreen("p").unwrap());
        assert!(!runtime.toggle_fullscreen("p").unwrap());

        frame.reject_fullscreen.set(true);
        assert!(matches!(
            runtime.toggle_fullscreen("p"),
            Err(PlaygroundError::Host(HostError::FullscreenRejected(_)))
        ));
        assert!(!frame.fullscreen.get());
        assert_eq!(sink.find(LogLevel::Error, "fullscreen_failed").len(), 1);
    }

    #[test]
    fn indent_replaces_selection_without_scheduling() {
        let mut runtime = PlaygroundRuntime::new();
        runtime.initialize(&container("p", true, None)).unwrap();
        let caret = runtime.insert_indent("p", PanelKind::Js, 0..4).unwrap();
        assert_eq!(caret, 2);
        assert_eq!(
            runtime.instance("p").unwrap().panel_text(PanelKind::Js),
            "  ();"
        );
        assert!(runtime.next_deadline().is_none());
        assert!(matches!(
            runtime.insert_indent("p", PanelKind::Js, 3..99),
            Err(PlaygroundError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn metrics_snapshot_follows_host_time() {
        let sink = MemorySink::new();
        let config = RuntimeConfig {
            logger: Some(Logger::new(sink.clone())),
            metrics_interval: Duration::from_secs(1),
            ..RuntimeConfig::default()
        };
        let mut runtime = PlaygroundRuntime::with_config(config);
        runtime.initialize(&container("p", true, None)).unwrap();
        runtime.edit("p", PanelKind::Html, "<p></p>").unwrap();
        runtime.advance(Duration::from_millis(999));
        assert!(sink.find(LogLevel::Info, "runtime_metrics").is_empty());

        runtime.advance(Duration::from_millis(1));
        let snapshots = sink.find(LogLevel::Info, "runtime_metrics");
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].target, "playground::runtime.metrics");
    }
}
