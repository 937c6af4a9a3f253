/// D3 build loaded into every preview unless the caller opts out.
pub const D3_SCRIPT_URL: &str = "https://d3js.org/d3.v7.min.js";

/// Design tokens (light and dark), scrollbar styling and a reset for `body`.
/// Emitted first inside the preview's `<style>` so user CSS can override it.
pub const BASE_STYLESHEET: &str = r#":root {
  --pink-a4: #e2008b23;
  --pink-1: #fffcfe;
  --pink-11: #c2298a;
  --gray-1: #fcfcfc;
  --gray-2: #f9f9f9;
  --gray-3: #f0f0f0;
  --gray-4: #e8e8e8;
  --gray-6: #d9d9d9;
  --gray-7: #cecece;
  --gray-8: #bbbbbb;
  --gray-9: #8d8d8d;
  --gray-11: #646464;
  --gray-12: #202020;
}

@media (prefers-color-scheme: dark) {
  :root {
    --gray-1: #111111;
    --gray-2: #191919;
    --gray-3: #222222;
    --gray-4: #2a2a2a;
    --gray-6: #3a3a3a;
    --gray-7: #484848;
    --gray-8: #606060;
    --gray-9: #6e6e6e;
    --gray-11: #b4b4b4;
    --gray-12: #eeeeee;
    --pink-1: #191117;
    --pink-11: #ff8dcc;
  }
}

* {
  scrollbar-width: thin;
  scrollbar-color: var(--gray-7) var(--gray-2);
}

*::-webkit-scrollbar {
  width: 8px;
  height: 8px;
}

*::-webkit-scrollbar-track {
  background: var(--gray-2);
}

*::-webkit-scrollbar-thumb {
  background: var(--gray-7);
  border-radius: 4px;
}

*::-webkit-scrollbar-thumb:hover {
  background: var(--gray-8);
}

body {
  margin: 0;
  padding: 0;
  overflow: auto;
}"#;
