use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use d3_playground::controls::{CheckboxControl, RangeControl};
use d3_playground::{
    AttributeSource, ControlDescriptor, ControlPanel, ControlPanelConfig, ControlValue, Delivery,
    DropReason, HostError, LogLevel, Logger, MemorySink, PanelKind, PlaygroundContainer,
    PlaygroundEvent, PlaygroundRuntime, PreviewMessage, PreviewSurface, RecordingObserver,
    RuntimeConfig,
};

#[derive(Default)]
struct FakeFrame {
    loaded: Cell<bool>,
    reloads: Cell<usize>,
    documents: RefCell<Vec<String>>,
    inbox: RefCell<Vec<(String, PreviewMessage)>>,
}

impl PreviewSurface for FakeFrame {
    fn has_window(&self) -> bool {
        true
    }
    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }
    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
    fn set_srcdoc(&self, document: &str) {
        self.loaded.set(false);
        self.documents.borrow_mut().push(document.to_string());
    }
    fn post_message(&self, message: &PreviewMessage, target_origin: &str) -> Result<(), HostError> {
        self.inbox
            .borrow_mut()
            .push((target_origin.to_string(), message.clone()));
        Ok(())
    }
    fn is_fullscreen(&self) -> bool {
        false
    }
    fn request_fullscreen(&self) -> Result<(), HostError> {
        Ok(())
    }
    fn exit_fullscreen(&self) {}
}

struct FakeContainer {
    attrs: HashMap<String, String>,
    panels: HashMap<PanelKind, String>,
    frame: Rc<FakeFrame>,
}

impl FakeContainer {
    fn new(id: &str, frame: &Rc<FakeFrame>) -> Self {
        let mut attrs = HashMap::new();
        attrs.insert("data-playground-id".to_string(), id.to_string());
        attrs.insert("data-editable".to_string(), "true".to_string());
        let mut panels = HashMap::new();
        panels.insert(PanelKind::Html, "<svg id=\"chart\"></svg>".to_string());
        panels.insert(PanelKind::Js, "render();".to_string());
        Self {
            attrs,
            panels,
            frame: Rc::clone(frame),
        }
    }

    fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }
}

impl AttributeSource for FakeContainer {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attrs.get(name).cloned()
    }
}

impl PlaygroundContainer for FakeContainer {
    fn panel_text(&self, panel: PanelKind) -> Option<String> {
        self.panels.get(&panel).cloned()
    }
    fn tabs(&self) -> Vec<String> {
        vec!["html".into(), "css".into(), "js".into()]
    }
    fn preview(&self) -> Option<Weak<dyn PreviewSurface>> {
        let surface: Rc<dyn PreviewSurface> = self.frame.clone();
        Some(Rc::downgrade(&surface))
    }
}

fn runtime() -> (PlaygroundRuntime, MemorySink, RecordingObserver) {
    let sink = MemorySink::new();
    let config = RuntimeConfig {
        logger: Some(Logger::new(sink.clone())),
        ..RuntimeConfig::default()
    };
    let mut runtime = PlaygroundRuntime::with_config(config);
    let recorder = RecordingObserver::new();
    runtime.register_observer(recorder.clone());
    (runtime, sink, recorder)
}

fn settle(runtime: &mut PlaygroundRuntime, id: &str) {
    runtime.preview_loaded(id).unwrap();
    runtime.advance(Duration::from_millis(200));
}

#[test]
fn burst_of_edits_rebuilds_once_with_last_text() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, recorder) = runtime();
    runtime
        .initialize(&FakeContainer::new("scatter", &frame).attr("data-js-controls", "wire();"))
        .unwrap();

    runtime.edit("scatter", PanelKind::Js, "v1();").unwrap();
    runtime.advance(Duration::from_millis(300));
    runtime.edit("scatter", PanelKind::Js, "v2();").unwrap();
    runtime.advance(Duration::from_millis(300));
    runtime.edit("scatter", PanelKind::Css, "circle { fill: red; }").unwrap();
    runtime.advance(Duration::from_millis(499));
    assert!(frame.documents.borrow().is_empty());

    runtime.advance(Duration::from_millis(1));
    let documents = frame.documents.borrow();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].contains("v2();\n\nwire();"));
    assert!(documents[0].contains("circle { fill: red; }"));
    assert_eq!(recorder.count("rebuilt"), 1);
    assert_eq!(recorder.count("rebuild_scheduled"), 3);
}

#[test]
fn rebuild_clears_readiness_until_load_settles() {
    let frame = Rc::new(FakeFrame::default());
    frame.loaded.set(true);
    let (mut runtime, sink, _) = runtime();
    runtime.initialize(&FakeContainer::new("p", &frame)).unwrap();
    runtime.advance(Duration::from_millis(200));
    assert!(runtime.is_ready("p"));
    assert!(runtime.send_to_preview("p", "radius", 3.0).is_delivered());

    runtime.rebuild("p").unwrap();
    assert!(!runtime.is_ready("p"));
    assert_eq!(
        runtime.send_to_preview("p", "radius", 4.0),
        Delivery::Dropped(DropReason::NotReady)
    );
    assert_eq!(sink.find(LogLevel::Warn, "message_dropped").len(), 1);

    runtime.advance(Duration::from_secs(2));
    assert!(!runtime.is_ready("p"));

    settle(&mut runtime, "p");
    assert!(runtime.is_ready("p"));
    assert!(runtime.send_to_preview("p", "radius", 5.0).is_delivered());

    let inbox = frame.inbox.borrow();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().all(|(origin, _)| origin == "*"));
}

#[test]
fn a_reload_during_settle_restarts_the_delay() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, _) = runtime();
    runtime.initialize(&FakeContainer::new("p", &frame)).unwrap();

    runtime.preview_loaded("p").unwrap();
    runtime.advance(Duration::from_millis(150));
    runtime.preview_loaded("p").unwrap();
    runtime.advance(Duration::from_millis(150));
    assert!(!runtime.is_ready("p"));
    runtime.advance(Duration::from_millis(50));
    assert!(runtime.is_ready("p"));
}

#[test]
fn panel_changes_reach_the_preview_as_control_change_messages() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, _) = runtime();
    runtime.initialize(&FakeContainer::new("bars", &frame)).unwrap();
    settle(&mut runtime, "bars");

    let panel = ControlPanel::new(
        "bars",
        ControlPanelConfig::new([
            ControlDescriptor::Range(RangeControl::new("padding", "Padding")),
            ControlDescriptor::Checkbox(CheckboxControl::new("labels", "Labels")),
        ]),
    );
    for message in panel.initial_values() {
        assert!(runtime.dispatch(message).is_delivered());
    }
    let change = panel.change("padding", "0.25").unwrap();
    assert!(runtime.dispatch(change).is_delivered());

    let inbox = frame.inbox.borrow();
    let json: Vec<String> = inbox
        .iter()
        .map(|(_, message)| message.to_json().unwrap())
        .collect();
    assert_eq!(json.len(), 3);
    assert_eq!(
        json[2],
        r#"{"type":"control-change","controlId":"padding","value":0.25,"playgroundId":"bars"}"#
    );
    let PreviewMessage::ControlChange(first) = &inbox[1].1;
    assert_eq!(first.value, ControlValue::Bool(false));
}

#[test]
fn reinitializing_an_id_cancels_the_old_instance_tasks() {
    let old_frame = Rc::new(FakeFrame::default());
    let new_frame = Rc::new(FakeFrame::default());
    let (mut runtime, sink, recorder) = runtime();
    runtime.initialize(&FakeContainer::new("p", &old_frame)).unwrap();
    runtime.edit("p", PanelKind::Js, "old();").unwrap();

    runtime.initialize(&FakeContainer::new("p", &new_frame)).unwrap();
    runtime.advance(Duration::from_secs(1));

    assert!(old_frame.documents.borrow().is_empty());
    assert!(new_frame.documents.borrow().is_empty());
    assert_eq!(runtime.registry().len(), 1);
    assert_eq!(recorder.count("replaced"), 1);
    assert_eq!(sink.find(LogLevel::Warn, "duplicate_playground_id").len(), 1);
}

#[test]
fn unregister_cancels_pending_rebuild() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, _) = runtime();
    runtime.initialize(&FakeContainer::new("p", &frame)).unwrap();
    runtime.edit("p", PanelKind::Html, "<p>gone</p>").unwrap();

    assert!(runtime.unregister("p"));
    assert!(!runtime.unregister("p"));
    assert!(runtime.next_deadline().is_none());
    runtime.advance(Duration::from_secs(1));
    assert!(frame.documents.borrow().is_empty());
}

#[test]
fn reset_notifies_observers_and_reloads() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, recorder) = runtime();
    runtime.initialize(&FakeContainer::new("p", &frame)).unwrap();
    settle(&mut runtime, "p");

    runtime.reset("p").unwrap();
    assert_eq!(frame.reloads.get(), 1);
    assert!(!runtime.is_ready("p"));
    assert!(
        recorder
            .events()
            .contains(&PlaygroundEvent::Reset { playground_id: "p".into() })
    );
}

#[test]
fn tabs_keep_exactly_one_active() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, _) = runtime();
    runtime.initialize(&FakeContainer::new("p", &frame)).unwrap();
    assert_eq!(runtime.instance("p").unwrap().active_tab(), Some("html"));

    runtime.activate_tab("p", "css").unwrap();
    assert_eq!(runtime.instance("p").unwrap().active_tab(), Some("css"));
    assert!(runtime.activate_tab("p", "output").is_err());
    assert_eq!(runtime.instance("p").unwrap().active_tab(), Some("css"));
}

#[test]
fn grid_attributes_shape_the_document() {
    let frame = Rc::new(FakeFrame::default());
    let (mut runtime, _, _) = runtime();
    runtime
        .initialize(
            &FakeContainer::new("grid", &frame)
                .attr("data-show-grid", "true")
                .attr("data-grid-size", "abc"),
        )
        .unwrap();
    runtime.rebuild("grid").unwrap();

    let documents = frame.documents.borrow();
    assert!(documents[0].contains("background-size: 50px 50px"));
    assert!(documents[0].contains("const gridSize = 50;"));
}
