//! Registry module orchestrator.
//!
//! The runtime owns one [`PlaygroundRegistry`]; nothing else keeps
//! per-playground state.

mod core;

pub use self::core::{PlaygroundId, PlaygroundInstance, PlaygroundRegistry, PlaygroundState};
