use std::collections::{BTreeMap, HashMap};

use crate::error::{PlaygroundError, Result};

pub const ATTR_PLAYGROUND_ID: &str = "data-playground-id";
pub const ATTR_EDITABLE: &str = "data-editable";
pub const ATTR_JS_CONTROLS: &str = "data-js-controls";
pub const ATTR_SHOW_GRID: &str = "data-show-grid";
pub const ATTR_GRID_SIZE: &str = "data-grid-size";

/// Grid overlay spacing used when `data-grid-size` is absent or unusable.
pub const DEFAULT_GRID_SIZE: u32 = 50;

/// Anything that exposes string attributes by name.
pub trait AttributeSource {
    fn attribute(&self, name: &str) -> Option<String>;
}

impl AttributeSource for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Typed view of the attributes a playground container carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundConfig {
    pub id: String,
    pub editable: bool,
    /// Script appended verbatim to the user JS on every rebuild.
    pub js_controls: String,
    pub show_grid: bool,
    pub grid_size: u32,
}

impl PlaygroundConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            editable: false,
            js_controls: String::new(),
            show_grid: false,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }

    pub fn from_attributes(source: &(impl AttributeSource + ?Sized)) -> Result<Self> {
        let id = source
            .attribute(ATTR_PLAYGROUND_ID)
            .filter(|id| !id.is_empty())
            .ok_or(PlaygroundError::MissingIdentifier)?;

        Ok(Self {
            id,
            editable: flag(source, ATTR_EDITABLE),
            js_controls: source.attribute(ATTR_JS_CONTROLS).unwrap_or_default(),
            show_grid: flag(source, ATTR_SHOW_GRID),
            grid_size: parse_grid_size(source.attribute(ATTR_GRID_SIZE).as_deref()),
        })
    }
}

fn flag(source: &(impl AttributeSource + ?Sized), name: &str) -> bool {
    source.attribute(name).as_deref() == Some("true")
}

/// Parse a grid size the way `parseInt(value, 10)` reads it: leading
/// whitespace is skipped and parsing stops at the first non-digit. Missing,
/// non-numeric and non-positive values fall back to [`DEFAULT_GRID_SIZE`].
pub fn parse_grid_size(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_GRID_SIZE;
    };
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(size) if size > 0 => size,
        _ => DEFAULT_GRID_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_full_attribute_set() {
        let source = attrs(&[
            (ATTR_PLAYGROUND_ID, "scales"),
            (ATTR_EDITABLE, "true"),
            (ATTR_JS_CONTROLS, "update();"),
            (ATTR_SHOW_GRID, "true"),
            (ATTR_GRID_SIZE, "25"),
        ]);
        let config = PlaygroundConfig::from_attributes(&source).unwrap();
        assert_eq!(config.id, "scales");
        assert!(config.editable);
        assert!(config.show_grid);
        assert_eq!(config.grid_size, 25);
        assert_eq!(config.js_controls, "update();");
    }

    #[test]
    fn flags_require_literal_true() {
        let source = attrs(&[(ATTR_PLAYGROUND_ID, "p"), (ATTR_EDITABLE, "yes")]);
        let config = PlaygroundConfig::from_attributes(&source).unwrap();
        assert!(!config.editable);
        assert!(!config.show_grid);
        assert_eq!(config.grid_size, DEFAULT_GRID_SIZE);
    }

    #[test]
    fn missing_or_empty_id_is_rejected() {
        let err = PlaygroundConfig::from_attributes(&attrs(&[])).unwrap_err();
        assert!(matches!(err, PlaygroundError::MissingIdentifier));
        let err = PlaygroundConfig::from_attributes(&attrs(&[(ATTR_PLAYGROUND_ID, "")]))
            .unwrap_err();
        assert!(matches!(err, PlaygroundError::MissingIdentifier));
    }

    #[test]
    fn grid_size_follows_parse_int() {
        assert_eq!(parse_grid_size(None), 50);
        assert_eq!(parse_grid_size(Some("40")), 40);
        assert_eq!(parse_grid_size(Some("  30px")), 30);
        assert_eq!(parse_grid_size(Some("abc")), 50);
        assert_eq!(parse_grid_size(Some("0")), 50);
        assert_eq!(parse_grid_size(Some("-20")), 50);
        assert_eq!(parse_grid_size(Some("")), 50);
    }
}
