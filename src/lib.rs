//! Interactive code playgrounds for the D3 course.
//!
//! Control panels compile from declarative descriptors into markup plus a
//! wiring script. The runtime tracks every playground on a page, debounces
//! edits into rebuilt preview documents and forwards control changes into the
//! sandboxed preview once it is ready. Course progress is kept in a small
//! persisted store next to it.
//!
//! The browser side stays behind the [`host`] traits; time is driven by the
//! host through [`PlaygroundRuntime::advance`].

pub mod controls;
pub mod course;
pub mod document;
pub mod error;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod protocol;
pub mod registry;
pub mod runtime;

pub use controls::{
    ControlDescriptor, ControlKind, ControlPanel, ControlPanelConfig, GridColumns, GridGap,
    compile, compile_all, compile_auto_wiring, compile_panel,
};
pub use course::{ChapterData, LessonData, LessonEntry, LessonLink, LessonNavigation};
pub use document::{DocumentOptions, build as build_document};
pub use error::{ControlError, HostError, PlaygroundError, ProgressError, Result, StorageError};
pub use host::{
    AttributeSource, PanelKind, PlaygroundConfig, PlaygroundContainer, PreviewSurface,
};
pub use logging::{
    LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink,
    StderrSink,
};
pub use metrics::{MetricSnapshot, RuntimeMetrics};
pub use progress::{
    CourseProgress, CourseProgressStore, FileStorage, KeyValueStorage, MemoryStorage,
};
pub use protocol::{ControlChangeMessage, ControlValue, PreviewMessage};
pub use registry::{PlaygroundInstance, PlaygroundRegistry, PlaygroundState};
pub use runtime::diagnostics::LifecycleLoggerObserver;
pub use runtime::events::{
    Delivery, DropReason, PlaygroundEvent, PlaygroundObserver, RecordingObserver,
};
pub use runtime::scheduler::{Scheduler, TaskHandle};
pub use runtime::{PlaygroundRuntime, PreviewSender, RuntimeConfig};
