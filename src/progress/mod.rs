//! Persisted course progress: lesson completion, skips and quiz tallies.

mod storage;
mod store;
mod types;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageResult};
pub use store::{CourseProgressStore, STORAGE_KEY};
pub use types::{ChapterProgress, CourseProgress, LessonProgress, QuizResults, QuizSummary};
