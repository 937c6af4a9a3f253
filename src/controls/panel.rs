use crate::error::ControlError;
use crate::protocol::{ControlChangeMessage, ControlValue};

use super::descriptor::ControlDescriptor;
use super::grid::ControlPanelConfig;

/// A compiled panel bound to one playground.
///
/// This is the typed counterpart of the generated wiring script: it turns a raw
/// input value into the [`ControlChangeMessage`] the script would send.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    playground_id: String,
    config: ControlPanelConfig,
}

impl ControlPanel {
    pub fn new(playground_id: impl Into<String>, config: ControlPanelConfig) -> Self {
        Self {
            playground_id: playground_id.into(),
            config,
        }
    }

    pub fn playground_id(&self) -> &str {
        &self.playground_id
    }

    pub fn config(&self) -> &ControlPanelConfig {
        &self.config
    }

    pub fn control(&self, control_id: &str) -> Option<&ControlDescriptor> {
        self.config.controls.iter().find(|c| c.id() == control_id)
    }

    /// Convert a raw input value into a change message.
    ///
    /// Ranges and numbers parse like `parseFloat`, checkboxes accept `true`,
    /// `on` or `checked`, colors and selects pass the text through.
    pub fn change(&self, control_id: &str, raw: &str) -> Result<ControlChangeMessage, ControlError> {
        let control = self
            .control(control_id)
            .ok_or_else(|| ControlError::UnknownControl(control_id.to_string()))?;

        let value = match control {
            ControlDescriptor::Range(_) | ControlDescriptor::Number(_) => {
                let number = parse_float_prefix(raw).ok_or_else(|| ControlError::InvalidNumber {
                    control: control_id.to_string(),
                    raw: raw.to_string(),
                })?;
                ControlValue::Number(number)
            }
            ControlDescriptor::Checkbox(_) => {
                ControlValue::Bool(matches!(raw.trim(), "true" | "on" | "checked"))
            }
            ControlDescriptor::Color(_) | ControlDescriptor::Select(_) => {
                ControlValue::Text(raw.to_string())
            }
            ControlDescriptor::Button(_) => {
                return Err(ControlError::ButtonHasNoValue(control_id.to_string()));
            }
        };

        Ok(ControlChangeMessage::new(
            self.playground_id.clone(),
            control_id,
            value,
        ))
    }

    /// The value every wired control starts with, in panel order. A preview
    /// that missed early messages can be brought in sync by replaying these.
    pub fn initial_values(&self) -> Vec<ControlChangeMessage> {
        self.config
            .controls
            .iter()
            .filter_map(|control| {
                let value = match control {
                    ControlDescriptor::Range(c) => ControlValue::Number(c.value),
                    ControlDescriptor::Number(c) => ControlValue::Number(c.value),
                    ControlDescriptor::Color(c) => ControlValue::Text(c.value.clone()),
                    ControlDescriptor::Select(c) => ControlValue::Text(c.selected()?.to_string()),
                    ControlDescriptor::Checkbox(c) => ControlValue::Bool(c.checked),
                    ControlDescriptor::Button(_) => return None,
                };
                Some(ControlChangeMessage::new(
                    self.playground_id.clone(),
                    control.id(),
                    value,
                ))
            })
            .collect()
    }
}

/// Longest numeric prefix of `raw`, read the way `parseFloat` reads it.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(&(b'+' | b'-'))) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(&(b'+' | b'-'))) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{
        ButtonControl, CheckboxControl, ColorControl, NumberControl, RangeControl, SelectControl,
        SelectOption,
    };

    fn panel() -> ControlPanel {
        ControlPanel::new(
            "scatter",
            ControlPanelConfig::new([
                ControlDescriptor::Range(RangeControl::new("radius", "Radius").value(6.0)),
                ControlDescriptor::Number(NumberControl::new("count", "Count")),
                ControlDescriptor::Checkbox(CheckboxControl::new("axis", "Axis").checked(true)),
                ControlDescriptor::Color(ColorControl::new("fill", "Fill")),
                ControlDescriptor::Select(SelectControl::new(
                    "curve",
                    "Curve",
                    [SelectOption::new("linear", "Linear")],
                )),
                ControlDescriptor::Button(ButtonControl::new("shuffle", "Shuffle")),
            ]),
        )
    }

    #[test]
    fn converts_raw_values_per_kind() {
        let panel = panel();
        let radius = panel.change("radius", "12.5").unwrap();
        assert_eq!(radius.value, ControlValue::Number(12.5));
        assert_eq!(radius.playground_id, "scatter");

        assert_eq!(panel.change("axis", "on").unwrap().value, ControlValue::Bool(true));
        assert_eq!(panel.change("axis", "false").unwrap().value, ControlValue::Bool(false));
        assert_eq!(
            panel.change("fill", "#ff0000").unwrap().value,
            ControlValue::Text("#ff0000".into())
        );
    }

    #[test]
    fn rejects_buttons_unknown_ids_and_garbage_numbers() {
        let panel = panel();
        assert_eq!(
            panel.change("shuffle", "").unwrap_err(),
            ControlError::ButtonHasNoValue("shuffle".into())
        );
        assert_eq!(
            panel.change("missing", "1").unwrap_err(),
            ControlError::UnknownControl("missing".into())
        );
        assert!(matches!(
            panel.change("count", "abc"),
            Err(ControlError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn initial_values_skip_buttons() {
        let values = panel().initial_values();
        let ids: Vec<_> = values.iter().map(|m| m.control_id.as_str()).collect();
        assert_eq!(ids, ["radius", "count", "axis", "fill", "curve"]);
        assert_eq!(values[0].value, ControlValue::Number(6.0));
        assert_eq!(values[4].value, ControlValue::Text("linear".into()));
    }

    #[test]
    fn parse_float_prefix_matches_parse_float() {
        assert_eq!(parse_float_prefix("42"), Some(42.0));
        assert_eq!(parse_float_prefix("  -3.5px"), Some(-3.5));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("px"), None);
        assert_eq!(parse_float_prefix(""), None);
    }
}
