use std::collections::BTreeMap;

use super::descriptor::ControlDescriptor;
use super::grid::ControlPanelConfig;
use super::markup::compile_all;

/// Class carried by every playground container.
pub const PLAYGROUND_CLASS: &str = "d3-playground";

/// Class of the element wrapping a compiled control panel. It carries the same
/// `data-playground-id` as the playground it drives.
pub const CONTROLS_CLASS: &str = "playground-controls";

/// Method the runtime binding exposes on each playground container.
pub const SEND_METHOD: &str = "sendToPreview";

/// Generate the script that forwards control changes to the owning playground.
///
/// The playground is resolved at run time through the shared
/// `data-playground-id`, so the panel may render anywhere on the page. Buttons
/// get a placeholder comment only.
pub fn compile_auto_wiring(controls: &[ControlDescriptor]) -> String {
    let listeners: Vec<String> = controls.iter().map(listener).collect();
    let body = format!(
        r#"const pg = document.querySelector('.{PLAYGROUND_CLASS}[data-playground-id="' + CSS.escape(playgroundId) + '"]');
if (!pg) return;

function initControls() {{
{listeners}
}}"#,
        listeners = listeners.join("\n"),
    );
    panel_script(&body, "initControls")
}

/// Merge caller-supplied handlers, keyed by control id, into one script. Each
/// body runs in its own block with `panel` and `playgroundId` in scope.
pub fn compile_custom_handlers(handlers: &BTreeMap<String, String>) -> String {
    let blocks: Vec<String> = handlers
        .iter()
        .map(|(id, code)| format!("// Custom handler for {}\n{{\n{}\n}}", comment_text(id), code))
        .collect();
    let body = format!(
        "function initCustomHandlers() {{\n{}\n}}",
        blocks.join("\n")
    );
    panel_script(&body, "initCustomHandlers")
}

/// Plain handler script for panels rendered inside the playground itself.
/// `pg` and `controlsContainer` are resolved from the script's position.
pub fn compile_handler_script(handlers: &BTreeMap<String, String>) -> String {
    let blocks: Vec<String> = handlers
        .iter()
        .map(|(id, code)| format!("// Handler for {}\n{}", comment_text(id), code))
        .collect();
    format!(
        "<script>\nconst pg = document.currentScript.closest('.{PLAYGROUND_CLASS}');\nconst controlsContainer = document.currentScript.closest('.controls-wrapper');\n\n{}\n</script>\n",
        blocks.join("\n")
    )
}

/// Markup, auto wiring and (when present) custom handlers for a whole panel.
pub fn compile_panel(config: &ControlPanelConfig) -> String {
    let mut out = compile_all(config);
    out.push_str(&compile_auto_wiring(&config.controls));
    if !config.custom_handlers.is_empty() {
        out.push_str(&compile_custom_handlers(&config.custom_handlers));
    }
    out
}

fn panel_script(body: &str, init_fn: &str) -> String {
    format!(
        r#"<script>
(function() {{
const panel = document.currentScript.closest('.{CONTROLS_CLASS}');
if (!panel) return;
const playgroundId = panel.getAttribute('data-playground-id');
if (!playgroundId) return;
{body}
if (document.readyState === 'loading') {{
  document.addEventListener('DOMContentLoaded', {init_fn});
}} else {{
  {init_fn}();
}}
}})();
</script>
"#
    )
}

fn listener(control: &ControlDescriptor) -> String {
    let id = control.id();
    let header = format!("// {} ({})", comment_text(control.label()), comment_text(id));
    let input = js_string(&format!("[data-control-id=\"{}\"]", css_attr(id)));
    let display = js_string(&format!("[data-control=\"{}\"]", css_attr(id)));
    let id_literal = js_string(id);

    match control {
        ControlDescriptor::Range(_) => format!(
            r#"{header}
{{
  const input = panel.querySelector({input});
  const valueDisplay = panel.querySelector({display});
  if (input && valueDisplay) {{
    input.addEventListener('input', (e) => {{
      const newValue = e.target.value;
      const unit = e.target.getAttribute('data-unit') || '';
      valueDisplay.textContent = newValue + unit;
      pg.{SEND_METHOD}({id_literal}, parseFloat(newValue));
    }});
  }}
}}"#
        ),
        ControlDescriptor::Color(_) => format!(
            r#"{header}
{{
  const input = panel.querySelector({input});
  const valueDisplay = panel.querySelector({display});
  if (input && valueDisplay) {{
    input.addEventListener('input', (e) => {{
      const newValue = e.target.value;
      valueDisplay.textContent = newValue;
      pg.{SEND_METHOD}({id_literal}, newValue);
    }});
  }}
}}"#
        ),
        ControlDescriptor::Select(_) => format!(
            r#"{header}
{{
  const input = panel.querySelector({input});
  if (input) {{
    input.addEventListener('change', (e) => {{
      pg.{SEND_METHOD}({id_literal}, e.target.value);
    }});
  }}
}}"#
        ),
        ControlDescriptor::Number(_) => format!(
            r#"{header}
{{
  const input = panel.querySelector({input});
  if (input) {{
    input.addEventListener('input', (e) => {{
      pg.{SEND_METHOD}({id_literal}, parseFloat(e.target.value));
    }});
  }}
}}"#
        ),
        ControlDescriptor::Checkbox(_) => format!(
            r#"{header}
{{
  const input = panel.querySelector({input});
  if (input) {{
    input.addEventListener('change', (e) => {{
      pg.{SEND_METHOD}({id_literal}, e.target.checked);
    }});
  }}
}}"#
        ),
        ControlDescriptor::Button(_) => format!(
            "// Button \"{}\" needs custom handler",
            comment_text(control.label())
        ),
    }
}

/// JSON string literals are valid JavaScript string literals. `<` is escaped
/// as well so no literal can close the surrounding `<script>` element.
fn js_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

fn css_attr(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

fn comment_text(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ").replace('<', "\u{2039}")
}
