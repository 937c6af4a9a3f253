use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use blake3::Hash;

use crate::host::{PanelKind, PlaygroundConfig, PreviewSurface};
use crate::runtime::scheduler::TaskHandle;

pub type PlaygroundId = String;

/// Lifecycle position of one playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaygroundState {
    /// Registered and wired; no edit is waiting.
    Initialized,
    /// An edit arrived and a rebuild is scheduled.
    EditingDebounced,
    /// A document was installed and the preview has not settled yet.
    Rebuilding,
}

/// Everything the runtime tracks for one rendered playground.
pub struct PlaygroundInstance {
    pub config: PlaygroundConfig,
    preview: Option<Weak<dyn PreviewSurface>>,
    panels: BTreeMap<PanelKind, String>,
    tabs: Vec<String>,
    active_tab: Option<usize>,
    pub(crate) state: PlaygroundState,
    pub(crate) preview_ready: bool,
    pub(crate) pending_rebuild: Option<TaskHandle>,
    pub(crate) pending_settle: Option<TaskHandle>,
    last_document: Option<Hash>,
}

impl PlaygroundInstance {
    pub fn new(
        config: PlaygroundConfig,
        preview: Option<Weak<dyn PreviewSurface>>,
        panels: BTreeMap<PanelKind, String>,
        tabs: Vec<String>,
    ) -> Self {
        let active_tab = if tabs.is_empty() { None } else { Some(0) };
        Self {
            config,
            preview,
            panels,
            tabs,
            active_tab,
            state: PlaygroundState::Initialized,
            preview_ready: false,
            pending_rebuild: None,
            pending_settle: None,
            last_document: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn state(&self) -> PlaygroundState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.preview_ready
    }

    pub fn is_editable(&self) -> bool {
        self.config.editable
    }

    /// Upgrade the weak preview handle. `None` once the host dropped it.
    pub fn preview(&self) -> Option<Rc<dyn PreviewSurface>> {
        self.preview.as_ref().and_then(Weak::upgrade)
    }

    pub fn has_preview(&self) -> bool {
        self.preview().is_some()
    }

    /// Current text of a panel; missing panels read as empty.
    pub fn panel_text(&self, panel: PanelKind) -> &str {
        self.panels.get(&panel).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn panel_mut(&mut self, panel: PanelKind) -> &mut String {
        self.panels.entry(panel).or_default()
    }

    pub(crate) fn set_panel_text(&mut self, panel: PanelKind, text: String) {
        self.panels.insert(panel, text);
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab
            .and_then(|idx| self.tabs.get(idx))
            .map(String::as_str)
    }

    /// Activate `tab`, deactivating every sibling. Returns `false` when the
    /// tab does not exist.
    pub(crate) fn activate_tab(&mut self, tab: &str) -> bool {
        match self.tabs.iter().position(|name| name == tab) {
            Some(idx) => {
                self.active_tab = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Remember the installed document. Returns `true` when it differs from the
    /// previous one.
    pub(crate) fn record_document(&mut self, document: &str) -> bool {
        let hash = blake3::hash(document.as_bytes());
        let changed = self.last_document.map(|h| h != hash).unwrap_or(true);
        self.last_document = Some(hash);
        changed
    }

    pub(crate) fn take_pending_tasks(&mut self) -> Vec<TaskHandle> {
        self.pending_rebuild
            .take()
            .into_iter()
            .chain(self.pending_settle.take())
            .collect()
    }
}

/// Playground instances keyed by their page-unique identifier.
#[derive(Default)]
pub struct PlaygroundRegistry {
    entries: HashMap<PlaygroundId, PlaygroundInstance>,
}

impl PlaygroundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an instance, returning the one it replaced. The caller owns the
    /// replaced instance's pending tasks and must cancel them.
    pub fn register(&mut self, instance: PlaygroundInstance) -> Option<PlaygroundInstance> {
        self.entries.insert(instance.id().to_string(), instance)
    }

    pub fn unregister(&mut self, id: &str) -> Option<PlaygroundInstance> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&PlaygroundInstance> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PlaygroundInstance> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
