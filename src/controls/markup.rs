use super::descriptor::{
    ButtonControl, CheckboxControl, ColorControl, ControlDescriptor, NumberControl, RangeControl,
    SelectControl,
};
use super::grid::{ControlPanelConfig, GRID_STYLESHEET};

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Compile one control into its markup.
pub fn compile(descriptor: &ControlDescriptor) -> String {
    match descriptor {
        ControlDescriptor::Range(c) => range(c),
        ControlDescriptor::Color(c) => color(c),
        ControlDescriptor::Select(c) => select(c),
        ControlDescriptor::Checkbox(c) => checkbox(c),
        ControlDescriptor::Number(c) => number(c),
        ControlDescriptor::Button(c) => button(c),
    }
}

/// Compile every control of a panel inside its grid container, followed by
/// the grid stylesheet.
pub fn compile_all(config: &ControlPanelConfig) -> String {
    let controls: String = config.controls.iter().map(compile).collect();
    format!(
        "<div class=\"control-grid\" data-columns=\"{}\" data-gap=\"{}\">\n{}</div>\n{}\n",
        config.columns.get(),
        config.gap,
        controls,
        GRID_STYLESHEET
    )
}

fn range(c: &RangeControl) -> String {
    let id = escape_html(&c.id);
    let unit = escape_html(&c.unit);
    format!(
        r#"<div class="range-control">
  <div class="range-header">
    <label for="{id}" class="range-label">{label}</label>
    <span class="range-value" data-control="{id}">{value}{unit}</span>
  </div>
  <input type="range" id="{id}" class="range-input" data-control-id="{id}" data-unit="{unit}" min="{min}" max="{max}" step="{step}" value="{value}" />
</div>
"#,
        label = escape_html(&c.label),
        value = c.value,
        min = c.min,
        max = c.max,
        step = c.step,
    )
}

fn color(c: &ColorControl) -> String {
    let id = escape_html(&c.id);
    let value = escape_html(&c.value);
    format!(
        r#"<div class="color-control">
  <label for="{id}" class="color-label">{label}</label>
  <div class="color-input-wrapper">
    <input type="color" id="{id}" class="color-input" data-control-id="{id}" value="{value}" />
    <span class="color-value" data-control="{id}">{value}</span>
  </div>
</div>
"#,
        label = escape_html(&c.label),
    )
}

fn select(c: &SelectControl) -> String {
    let id = escape_html(&c.id);
    let selected = c.selected();
    let options: String = c
        .options
        .iter()
        .map(|opt| {
            let marker = if Some(opt.value.as_str()) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                "    <option value=\"{}\"{}>{}</option>\n",
                escape_html(&opt.value),
                marker,
                escape_html(&opt.label)
            )
        })
        .collect();
    format!(
        r#"<div class="select-control">
  <label for="{id}" class="select-label">{label}</label>
  <select id="{id}" class="select-input" data-control-id="{id}">
{options}  </select>
</div>
"#,
        label = escape_html(&c.label),
    )
}

fn checkbox(c: &CheckboxControl) -> String {
    let id = escape_html(&c.id);
    let checked = if c.checked { " checked" } else { "" };
    format!(
        r#"<div class="checkbox-control">
  <input type="checkbox" id="{id}" class="checkbox-input" data-control-id="{id}"{checked} />
  <label for="{id}" class="checkbox-label">{label}</label>
</div>
"#,
        label = escape_html(&c.label),
    )
}

fn number(c: &NumberControl) -> String {
    let id = escape_html(&c.id);
    let unit = escape_html(&c.unit);
    let min = c.min.map(|v| format!(" min=\"{v}\"")).unwrap_or_default();
    let max = c.max.map(|v| format!(" max=\"{v}\"")).unwrap_or_default();
    let unit_badge = if c.unit.is_empty() {
        String::new()
    } else {
        format!("\n    <span class=\"number-unit\">{unit}</span>")
    };
    format!(
        r#"<div class="number-control">
  <label for="{id}" class="number-label">{label}</label>
  <div class="number-input-wrapper">
    <input type="number" id="{id}" class="number-input" data-control-id="{id}" data-unit="{unit}"{min}{max} step="{step}" value="{value}" />{unit_badge}
  </div>
</div>
"#,
        label = escape_html(&c.label),
        step = c.step,
        value = c.value,
    )
}

fn button(c: &ButtonControl) -> String {
    let id = escape_html(&c.id);
    let full = if c.full_width { " button-full" } else { "" };
    format!(
        r#"<button id="{id}" class="button-control button-{variant}{full}" data-control-id="{id}">{label}</button>
"#,
        variant = c.variant.as_str(),
        label = escape_html(&c.label),
    )
}
