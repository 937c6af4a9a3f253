//! Preview document assembly.
//!
//! [`build`] turns the three code panels into one self-contained HTML
//! document for a sandboxed frame. User content is embedded verbatim; the
//! sandbox attributes on the consuming frame are the security boundary, not
//! this module.

mod assets;

use crate::host::DEFAULT_GRID_SIZE;
use crate::protocol::{CONTROL_EVENT, MESSAGE_TYPE};

pub use assets::{BASE_STYLESHEET, D3_SCRIPT_URL};

/// Knobs that shape a preview document beyond the user's own code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    pub show_grid: bool,
    /// Tick spacing of the grid overlay in pixels.
    pub grid_size: u32,
    /// External scripts loaded in `<head>` before any user code runs.
    pub library_scripts: Vec<String>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_size: DEFAULT_GRID_SIZE,
            library_scripts: vec![D3_SCRIPT_URL.to_string()],
        }
    }
}

impl DocumentOptions {
    pub fn with_grid(mut self, grid_size: u32) -> Self {
        self.show_grid = true;
        self.grid_size = grid_size;
        self
    }

    pub fn without_libraries(mut self) -> Self {
        self.library_scripts.clear();
        self
    }

    fn effective_grid_size(&self) -> u32 {
        if self.grid_size == 0 {
            DEFAULT_GRID_SIZE
        } else {
            self.grid_size
        }
    }
}

/// Assemble a complete preview document.
///
/// Order matters: the base stylesheet precedes user CSS so user rules win, and
/// the message bootstrap is registered before user JS so a control change can
/// be handled from the first statement the user writes.
pub fn build(html: &str, css: &str, js: &str, options: &DocumentOptions) -> String {
    let mut doc = String::with_capacity(
        BASE_STYLESHEET.len() + html.len() + css.len() + js.len() + 2048,
    );

    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    doc.push_str("<meta charset=\"UTF-8\">\n");
    doc.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    doc.push_str("<style>\n");
    doc.push_str(BASE_STYLESHEET);
    doc.push('\n');
    doc.push_str(css);
    doc.push_str("\n</style>\n");

    if options.show_grid {
        doc.push_str(&grid_styles(options.effective_grid_size()));
    }

    for src in &options.library_scripts {
        doc.push_str(&format!("<script src=\"{src}\"></script>\n"));
    }

    doc.push_str("</head>\n");
    doc.push_str("<body style=\"background-color: var(--gray-1); color: var(--gray-12);\">\n");
    doc.push_str(html);
    doc.push_str("\n<script>\n");
    doc.push_str(&bootstrap_script());
    doc.push('\n');
    doc.push_str(js);
    doc.push_str("\n</script>\n");

    if options.show_grid {
        doc.push_str(&grid_script(options.effective_grid_size()));
    }

    doc.push_str("</body>\n</html>\n");
    doc
}

/// Listener that turns posted control changes into a local custom event.
pub fn bootstrap_script() -> String {
    format!(
        r#"window.addEventListener('message', (event) => {{
  const data = event.data;
  if (!data || data.type !== '{MESSAGE_TYPE}') return;
  window.dispatchEvent(new CustomEvent('{CONTROL_EVENT}', {{
    detail: {{
      controlId: data.controlId,
      value: data.value,
      playgroundId: data.playgroundId
    }}
  }}));
}});"#
    )
}

fn grid_styles(grid_size: u32) -> String {
    format!(
        r#"<style>
body {{
  background-image:
    linear-gradient(var(--gray-3) 1px, transparent 1px),
    linear-gradient(90deg, var(--gray-3) 1px, transparent 1px);
  background-size: {grid_size}px {grid_size}px;
  background-position: -1px -1px;
}}
.grid-labels {{
  position: absolute;
  top: 0;
  left: 0;
  right: 0;
  bottom: 0;
  pointer-events: none;
  z-index: 9998;
  font-family: monospace;
  font-size: 8px;
  color: var(--gray-12);
  font-weight: 600;
  opacity: 0.7;
}}
.grid-label-x, .grid-label-y {{ position: absolute; }}
</style>
"#
    )
}

fn grid_script(grid_size: u32) -> String {
    format!(
        r#"<script>
(function() {{
  const gridSize = {grid_size};
  const labels = document.createElement('div');
  labels.className = 'grid-labels';
  document.body.appendChild(labels);
  const maxWidth = Math.max(document.body.scrollWidth, window.innerWidth, 2000);
  const maxHeight = Math.max(document.body.scrollHeight, window.innerHeight, 1000);
  for (let x = gridSize; x < maxWidth; x += gridSize) {{
    const label = document.createElement('div');
    label.className = 'grid-label-x';
    label.style.left = x + 'px';
    label.style.top = '2px';
    label.style.transform = 'translateX(-50%)';
    label.textContent = x;
    labels.appendChild(label);
  }}
  for (let y = gridSize; y < maxHeight; y += gridSize) {{
    const label = document.createElement('div');
    label.className = 'grid-label-y';
    label.style.left = '2px';
    label.style.top = y + 'px';
    label.style.transform = 'translateY(-50%)';
    label.textContent = y;
    labels.appendChild(label);
  }}
}})();
</script>
"#
    )
}

/// Short content hash of a built document, used to correlate rebuild logs.
pub fn fingerprint(document: &str) -> String {
    let hash = blake3::hash(document.as_bytes());
    hash.to_hex()[..16].to_string()
}
