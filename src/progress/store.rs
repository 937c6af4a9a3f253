use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde_json::json;

use crate::course::ChapterData;
use crate::error::{ProgressError, StorageError};
use crate::logging::{self, LogLevel, Logger, json_kv, json_str};

use super::storage::KeyValueStorage;
use super::types::{ChapterProgress, CourseProgress, LessonProgress, QuizSummary};

/// Key the whole course snapshot is stored under.
pub const STORAGE_KEY: &str = "d3js-course-progress";

const PROGRESS_TARGET: &str = "playground::progress";

/// Lesson completion, skips and quiz tallies for the course.
///
/// The snapshot is read from storage on first use; absent or malformed data
/// starts from an empty course. Every successful mutation is written back
/// synchronously. Storage failures are logged and never surface to callers.
pub struct CourseProgressStore<S> {
    storage: S,
    logger: Option<Logger>,
    progress: OnceCell<CourseProgress>,
}

impl<S: KeyValueStorage> CourseProgressStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            logger: None,
            progress: OnceCell::new(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Add a chapter and its lessons. Returns `false` when the chapter already
    /// exists, in which case nothing changes.
    pub fn initialize_chapter<I, L, T>(&mut self, chapter: &str, title: &str, lessons: I) -> bool
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        let created = self.with_progress(|progress| {
            if progress.chapters.contains_key(chapter) {
                return false;
            }
            let lessons: BTreeMap<String, LessonProgress> = lessons
                .into_iter()
                .map(|(slug, lesson_title)| (slug.into(), LessonProgress::new(lesson_title)))
                .collect();
            progress.chapters.insert(
                chapter.to_string(),
                ChapterProgress {
                    title: title.to_string(),
                    lessons,
                    quiz_summary: None,
                },
            );
            progress.update_totals();
            true
        });

        if created {
            self.persist();
        }
        self.log(
            LogLevel::Debug,
            if created {
                "chapter_initialized"
            } else {
                "chapter_already_initialized"
            },
            [json_str("chapter", chapter)],
        );
        created
    }

    /// Initialize every chapter of a course structure.
    pub fn initialize_course_progress(&mut self, structure: &[ChapterData]) {
        for chapter in structure {
            let lessons = chapter
                .lessons
                .iter()
                .map(|lesson| (lesson.slug.as_str(), lesson.title.as_str()));
            self.initialize_chapter(&chapter.slug, &chapter.title, lessons);
        }
    }

    /// Mark a lesson complete. Completion is permanent: it clears a skip and
    /// cannot be applied twice.
    pub fn mark_lesson_completed(&mut self, chapter: &str, lesson: &str) -> Result<(), ProgressError> {
        let outcome = self.with_progress(|progress| {
            let entry = progress.lesson_mut(chapter, lesson)?;
            if entry.completed {
                return Err(ProgressError::AlreadyCompleted {
                    chapter: chapter.to_string(),
                    lesson: lesson.to_string(),
                });
            }
            entry.completed = true;
            entry.skipped = false;
            progress.update_totals();
            Ok(())
        });
        self.commit("lesson_completed", chapter, lesson, outcome)
    }

    /// Mark a lesson skipped. Completed lessons cannot be skipped.
    pub fn mark_lesson_skipped(&mut self, chapter: &str, lesson: &str) -> Result<(), ProgressError> {
        let outcome = self.with_progress(|progress| {
            let entry = progress.lesson_mut(chapter, lesson)?;
            if entry.completed {
                return Err(ProgressError::AlreadyCompleted {
                    chapter: chapter.to_string(),
                    lesson: lesson.to_string(),
                });
            }
            entry.skipped = true;
            progress.update_totals();
            Ok(())
        });
        self.commit("lesson_skipped", chapter, lesson, outcome)
    }

    /// Record one quiz attempt for a lesson.
    pub fn save_quiz_result(
        &mut self,
        chapter: &str,
        lesson: &str,
        quiz_id: &str,
        passed: bool,
    ) -> Result<(), ProgressError> {
        let outcome = self.with_progress(|progress| {
            progress
                .lesson_mut(chapter, lesson)?
                .quiz_results
                .get_or_insert_with(Default::default)
                .record(passed);
            Ok(())
        });
        match outcome {
            Ok(()) => {
                self.persist();
                self.log(
                    LogLevel::Debug,
                    "quiz_result_saved",
                    [
                        json_str("chapter", chapter),
                        json_str("lesson", lesson),
                        json_str("quiz_id", quiz_id),
                        json_kv("passed", json!(passed)),
                    ],
                );
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    /// Recompute and store the quiz summary of a chapter.
    pub fn calculate_chapter_quiz_summary(&mut self, chapter: &str) -> Result<QuizSummary, ProgressError> {
        let outcome = self.with_progress(|progress| {
            let entry = progress.chapter_mut(chapter)?;
            let summary = QuizSummary::from_lessons(entry.lessons.values());
            entry.quiz_summary = Some(summary);
            Ok(summary)
        });
        match outcome {
            Ok(summary) => {
                self.persist();
                self.log(
                    LogLevel::Debug,
                    "quiz_summary_calculated",
                    [
                        json_str("chapter", chapter),
                        json_kv("total_quizzes", json!(summary.total_quizzes)),
                        json_kv("percentage", json!(summary.percentage)),
                    ],
                );
                Ok(summary)
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    pub fn lesson_progress(&self, chapter: &str, lesson: &str) -> Option<&LessonProgress> {
        self.progress().lesson(chapter, lesson)
    }

    /// Last stored quiz summary. Use
    /// [`calculate_chapter_quiz_summary`](Self::calculate_chapter_quiz_summary)
    /// to refresh it.
    pub fn chapter_quiz_summary(&self, chapter: &str) -> Option<QuizSummary> {
        self.progress().chapter(chapter)?.quiz_summary
    }

    pub fn all_progress(&self) -> &CourseProgress {
        self.progress()
    }

    /// Forget everything and store the empty course.
    pub fn reset_progress(&mut self) {
        self.progress = OnceCell::from(CourseProgress::default());
        self.persist();
        self.log(LogLevel::Info, "progress_reset", std::iter::empty());
    }

    fn progress(&self) -> &CourseProgress {
        self.progress.get_or_init(|| self.hydrate())
    }

    fn with_progress<T>(&mut self, update: impl FnOnce(&mut CourseProgress) -> T) -> T {
        let mut progress = match self.progress.take() {
            Some(progress) => progress,
            None => self.hydrate(),
        };
        let out = update(&mut progress);
        self.progress = OnceCell::from(progress);
        out
    }

    fn hydrate(&self) -> CourseProgress {
        if !self.storage.is_available() {
            return CourseProgress::default();
        }
        let stored = match self.storage.get(STORAGE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return CourseProgress::default(),
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "load_failed",
                    [
                        json_str("backend", self.storage.name()),
                        json_str("error", err.to_string()),
                    ],
                );
                return CourseProgress::default();
            }
        };
        match serde_json::from_str(&stored) {
            Ok(progress) => progress,
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "load_failed",
                    [
                        json_str("backend", self.storage.name()),
                        json_str("error", err.to_string()),
                    ],
                );
                CourseProgress::default()
            }
        }
    }

    fn persist(&self) {
        if !self.storage.is_available() {
            return;
        }
        let result = serde_json::to_string(self.progress())
            .map_err(StorageError::from)
            .and_then(|text| self.storage.set(STORAGE_KEY, &text));
        if let Err(err) = result {
            self.log(
                LogLevel::Error,
                "save_failed",
                [
                    json_str("backend", self.storage.name()),
                    json_str("error", err.to_string()),
                ],
            );
        }
    }

    fn commit(
        &self,
        message: &str,
        chapter: &str,
        lesson: &str,
        outcome: Result<(), ProgressError>,
    ) -> Result<(), ProgressError> {
        match outcome {
            Ok(()) => {
                self.persist();
                self.log(
                    LogLevel::Info,
                    message,
                    [json_str("chapter", chapter), json_str("lesson", lesson)],
                );
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    fn reject(&self, err: &ProgressError) {
        let level = match err {
            ProgressError::AlreadyCompleted { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        };
        self.log(level, "progress_rejected", [json_str("error", err.to_string())]);
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        logging::emit(self.logger.as_ref(), level, PROGRESS_TARGET, message, fields);
    }
}
