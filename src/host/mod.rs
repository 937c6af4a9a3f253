//! Seams to the embedding environment.
//!
//! The runtime never touches a DOM directly. Containers, preview surfaces and
//! storage are reached through the traits here, which a browser binding or a
//! test double implements.

mod attributes;

use std::fmt;
use std::rc::Weak;
use std::str::FromStr;

use crate::error::{HostError, PlaygroundError};
use crate::protocol::PreviewMessage;

pub use attributes::{
    AttributeSource, DEFAULT_GRID_SIZE, PlaygroundConfig, ATTR_EDITABLE, ATTR_GRID_SIZE,
    ATTR_JS_CONTROLS, ATTR_PLAYGROUND_ID, ATTR_SHOW_GRID, parse_grid_size,
};

/// The three editable code panels of a playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelKind {
    Html,
    Css,
    Js,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Html, PanelKind::Css, PanelKind::Js];

    pub fn as_str(self) -> &'static str {
        match self {
            PanelKind::Html => "html",
            PanelKind::Css => "css",
            PanelKind::Js => "js",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = PlaygroundError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "html" => Ok(PanelKind::Html),
            "css" => Ok(PanelKind::Css),
            "js" => Ok(PanelKind::Js),
            other => Err(PlaygroundError::UnknownPanel(other.to_string())),
        }
    }
}

/// A rendered playground container as seen at initialization time.
pub trait PlaygroundContainer: AttributeSource {
    /// Initial text of a code panel, `None` when the panel is not rendered.
    fn panel_text(&self, panel: PanelKind) -> Option<String>;

    /// Tab names in document order. The first one starts active.
    fn tabs(&self) -> Vec<String>;

    /// Handle to the sandboxed preview, owned by the host.
    fn preview(&self) -> Option<Weak<dyn PreviewSurface>>;
}

/// The sandboxed frame that renders a playground document.
///
/// Methods take `&self`: the surface is a host handle, and the host owns its
/// mutable state.
pub trait PreviewSurface {
    /// Whether the frame currently has a live window to post into.
    fn has_window(&self) -> bool;

    /// Whether the current document already fired its load signal.
    fn is_loaded(&self) -> bool;

    /// Reload the current document from scratch.
    fn reload(&self);

    /// Replace the document through the `srcdoc` mechanism.
    fn set_srcdoc(&self, document: &str);

    fn post_message(&self, message: &PreviewMessage, target_origin: &str)
    -> Result<(), HostError>;

    /// Whether the preview section is the current fullscreen element.
    fn is_fullscreen(&self) -> bool;

    fn request_fullscreen(&self) -> Result<(), HostError>;

    fn exit_fullscreen(&self);
}
