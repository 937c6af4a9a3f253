use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

use super::ControlDescriptor;

/// Column count of a control grid, restricted to 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridColumns(u8);

impl GridColumns {
    pub fn new(columns: u8) -> Result<Self, ControlError> {
        if (1..=4).contains(&columns) {
            Ok(Self(columns))
        } else {
            Err(ControlError::InvalidColumns(columns))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for GridColumns {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for GridColumns {
    type Error = ControlError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GridColumns> for u8 {
    fn from(value: GridColumns) -> Self {
        value.0
    }
}

/// Spacing between grid cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridGap {
    S,
    #[default]
    M,
    L,
}

impl GridGap {
    pub fn as_str(self) -> &'static str {
        match self {
            GridGap::S => "s",
            GridGap::M => "m",
            GridGap::L => "l",
        }
    }
}

impl fmt::Display for GridGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridGap {
    type Err = ControlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "s" => Ok(GridGap::S),
            "m" => Ok(GridGap::M),
            "l" => Ok(GridGap::L),
            other => Err(ControlError::InvalidGap(other.to_string())),
        }
    }
}

/// Full description of one control panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanelConfig {
    #[serde(default)]
    pub columns: GridColumns,
    #[serde(default)]
    pub gap: GridGap,
    pub controls: Vec<ControlDescriptor>,
    /// Script bodies keyed by control id, merged verbatim. Buttons need one.
    #[serde(default)]
    pub custom_handlers: BTreeMap<String, String>,
}

impl ControlPanelConfig {
    pub fn new(controls: impl IntoIterator<Item = ControlDescriptor>) -> Self {
        Self {
            controls: controls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn columns(mut self, columns: GridColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn gap(mut self, gap: GridGap) -> Self {
        self.gap = gap;
        self
    }

    pub fn handler(mut self, control_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.custom_handlers.insert(control_id.into(), code.into());
        self
    }
}

/// Layout rules for `.control-grid`, keyed off its `data-columns` and
/// `data-gap` attributes.
pub const GRID_STYLESHEET: &str = r#"<style>
.control-grid {
  display: grid;
  gap: var(--gap-size);
  width: 100%;
}
.control-grid[data-columns="1"] { grid-template-columns: 1fr; }
.control-grid[data-columns="2"] { grid-template-columns: repeat(auto-fit, minmax(min(200px, 100%), 1fr)); }
.control-grid[data-columns="3"] { grid-template-columns: repeat(auto-fit, minmax(min(180px, 100%), 1fr)); }
.control-grid[data-columns="4"] { grid-template-columns: repeat(auto-fit, minmax(min(150px, 100%), 1fr)); }
.control-grid[data-gap="s"] { --gap-size: var(--space-xs); }
.control-grid[data-gap="m"] { --gap-size: var(--space-s); }
.control-grid[data-gap="l"] { --gap-size: var(--space-m); }
@media (max-width: 640px) {
  .control-grid[data-columns="2"],
  .control-grid[data-columns="3"],
  .control-grid[data-columns="4"] { grid-template-columns: 1fr; }
}
.button-full { width: 100%; }
</style>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn columns_are_bounded() {
        assert_eq!(GridColumns::new(4).unwrap().get(), 4);
        assert_eq!(GridColumns::new(0), Err(ControlError::InvalidColumns(0)));
        assert_eq!(GridColumns::new(5), Err(ControlError::InvalidColumns(5)));
        assert_eq!(GridColumns::default().get(), 2);
    }

    #[test]
    fn gap_parses_short_names() {
        assert_eq!("l".parse::<GridGap>().unwrap(), GridGap::L);
        assert!("xl".parse::<GridGap>().is_err());
    }

    #[test]
    fn config_rejects_out_of_range_columns() {
        let err = serde_json::from_value::<ControlPanelConfig>(json!({
            "columns": 7,
            "controls": []
        }));
        assert!(err.is_err());

        let config: ControlPanelConfig = serde_json::from_value(json!({
            "columns": 3,
            "gap": "s",
            "controls": [],
            "customHandlers": {"reset": "pg.reset();"}
        }))
        .unwrap();
        assert_eq!(config.columns.get(), 3);
        assert_eq!(config.gap, GridGap::S);
        assert_eq!(config.custom_handlers["reset"], "pg.reset();");
    }
}
