//! Wire types crossing the boundary between the host page and the sandboxed
//! preview document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator carried in the `type` field of every preview message.
pub const MESSAGE_TYPE: &str = "control-change";

/// Name of the custom event the preview bootstrap re-dispatches on `window`.
pub const CONTROL_EVENT: &str = "playgroundControlChange";

/// Target origin used when posting into the sandbox. The preview runs with an
/// opaque origin, so nothing narrower can match it.
pub const TARGET_ORIGIN: &str = "*";

/// Value produced by a control. Serialized untagged so the sandbox sees plain
/// JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for ControlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ControlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A single user interaction on a control panel, addressed to one playground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlChangeMessage {
    pub control_id: String,
    pub value: ControlValue,
    pub playground_id: String,
}

impl ControlChangeMessage {
    pub fn new(
        playground_id: impl Into<String>,
        control_id: impl Into<String>,
        value: impl Into<ControlValue>,
    ) -> Self {
        Self {
            control_id: control_id.into(),
            value: value.into(),
            playground_id: playground_id.into(),
        }
    }
}

/// Envelope posted into the preview window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PreviewMessage {
    #[serde(rename = "control-change")]
    ControlChange(ControlChangeMessage),
}

impl PreviewMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
