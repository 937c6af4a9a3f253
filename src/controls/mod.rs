//! Control panels: declarative descriptors compiled into markup plus the
//! script that forwards their changes to a playground.
//!
//! Everything here is a pure function of its input. The same descriptor always
//! compiles to byte-identical output.

mod descriptor;
mod grid;
mod markup;
mod panel;
mod wiring;

pub use descriptor::{
    ButtonControl, ButtonVariant, CheckboxControl, ColorControl, ControlDescriptor, ControlKind,
    NumberControl, RangeControl, SelectControl, SelectOption,
};
pub use grid::{ControlPanelConfig, GridColumns, GridGap, GRID_STYLESHEET};
pub use markup::{compile, compile_all, escape_html};
pub use panel::{ControlPanel, parse_float_prefix};
pub use wiring::{
    CONTROLS_CLASS, PLAYGROUND_CLASS, SEND_METHOD, compile_auto_wiring, compile_custom_handlers,
    compile_handler_script, compile_panel,
};
