//! Error module orchestrator.
//!
//! Every fallible operation in the crate reports through the enums defined in
//! the private `types` module.

mod types;

pub use types::{ControlError, HostError, PlaygroundError, ProgressError, Result, StorageError};
