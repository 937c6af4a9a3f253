use thiserror::Error;

/// Unified result type for the playground runtime.
pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Errors surfaced by the playground runtime.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("playground container is missing `data-playground-id`")]
    MissingIdentifier,
    #[error("playground `{0}` not found")]
    UnknownPlayground(String),
    #[error("playground `{0}` is not editable")]
    NotEditable(String),
    #[error("unknown code panel `{0}`")]
    UnknownPanel(String),
    #[error("playground `{0}` has no preview surface")]
    NoPreview(String),
    #[error("unknown tab `{tab}` in playground `{playground}`")]
    UnknownTab { playground: String, tab: String },
    #[error("selection {start}..{end} is not valid in a {len}-byte panel")]
    InvalidSelection { start: usize, end: usize, len: usize },
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

/// Failures reported by the embedding environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("fullscreen request rejected: {0}")]
    FullscreenRejected(String),
    #[error("message delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Logical rejections from the course progress store. State is left unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("chapter `{0}` not found")]
    ChapterNotFound(String),
    #[error("lesson `{lesson}` not found in chapter `{chapter}`")]
    LessonNotFound { chapter: String, lesson: String },
    #[error("lesson `{lesson}` in chapter `{chapter}` is already complete")]
    AlreadyCompleted { chapter: String, lesson: String },
}

/// Persistence failures for key/value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Invalid control panel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("grid columns must be 1-4, got {0}")]
    InvalidColumns(u8),
    #[error("grid gap must be one of s, m, l, got `{0}`")]
    InvalidGap(String),
    #[error("control `{0}` not found in panel")]
    UnknownControl(String),
    #[error("control `{0}` is a button and carries no value")]
    ButtonHasNoValue(String),
    #[error("control `{control}` expects a number, got `{raw}`")]
    InvalidNumber { control: String, raw: String },
}
