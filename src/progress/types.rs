use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// Persisted snapshot of the whole course. The rollup counters are derived
/// from the lessons and recomputed after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    #[serde(default)]
    pub chapters: BTreeMap<String, ChapterProgress>,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub title: String,
    #[serde(default)]
    pub lessons: BTreeMap<String, LessonProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_summary: Option<QuizSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_results: Option<QuizResults>,
}

impl LessonProgress {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Pass/fail tally of the quizzes attempted in one lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub passed: u32,
    pub failed: u32,
    pub total_quizzes: u32,
}

impl QuizResults {
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed = self.passed.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
        self.total_quizzes = self.total_quizzes.saturating_add(1);
    }
}

/// Quiz totals across a chapter. `percentage` is 0-100, and 0 when no quiz
/// was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub total_passed: u32,
    pub total_failed: u32,
    pub total_quizzes: u32,
    pub percentage: f64,
}

impl QuizSummary {
    pub fn from_lessons<'a>(lessons: impl IntoIterator<Item = &'a LessonProgress>) -> Self {
        let mut summary = Self::default();
        for results in lessons.into_iter().filter_map(|lesson| lesson.quiz_results) {
            summary.total_passed = summary.total_passed.saturating_add(results.passed);
            summary.total_failed = summary.total_failed.saturating_add(results.failed);
            summary.total_quizzes = summary.total_quizzes.saturating_add(results.total_quizzes);
        }
        summary.percentage = if summary.total_quizzes > 0 {
            f64::from(summary.total_passed) / f64::from(summary.total_quizzes) * 100.0
        } else {
            0.0
        };
        summary
    }
}

impl CourseProgress {
    pub fn chapter(&self, chapter: &str) -> Option<&ChapterProgress> {
        self.chapters.get(chapter)
    }

    pub fn lesson(&self, chapter: &str, lesson: &str) -> Option<&LessonProgress> {
        self.chapters.get(chapter)?.lessons.get(lesson)
    }

    pub(crate) fn chapter_mut(&mut self, chapter: &str) -> Result<&mut ChapterProgress, ProgressError> {
        self.chapters
            .get_mut(chapter)
            .ok_or_else(|| ProgressError::ChapterNotFound(chapter.to_string()))
    }

    pub(crate) fn lesson_mut(
        &mut self,
        chapter: &str,
        lesson: &str,
    ) -> Result<&mut LessonProgress, ProgressError> {
        self.chapter_mut(chapter)?
            .lessons
            .get_mut(lesson)
            .ok_or_else(|| ProgressError::LessonNotFound {
                chapter: chapter.to_string(),
                lesson: lesson.to_string(),
            })
    }

    /// Recompute the rollups. A lesson that is both skipped and completed
    /// counts as completed only.
    pub(crate) fn update_totals(&mut self) {
        let (mut completed, mut skipped, mut total) = (0, 0, 0);
        for lesson in self.chapters.values().flat_map(|chapter| chapter.lessons.values()) {
            total += 1;
            if lesson.completed {
                completed += 1;
            } else if lesson.skipped {
                skipped += 1;
            }
        }
        self.completed = completed;
        self.skipped = skipped;
        self.total = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_stored_camel_case_shape() {
        let stored = json!({
            "chapters": {
                "intro": {
                    "title": "Introduction",
                    "lessons": {
                        "a": {"title": "A", "completed": true, "skipped": false,
                              "quizResults": {"passed": 2, "failed": 1, "totalQuizzes": 3}}
                    },
                    "quizSummary": {"totalPassed": 2, "totalFailed": 1, "totalQuizzes": 3, "percentage": 66.0}
                }
            },
            "completed": 1,
            "skipped": 0,
            "total": 1
        });
        let progress: CourseProgress = serde_json::from_value(stored).unwrap();
        let lesson = progress.lesson("intro", "a").unwrap();
        assert_eq!(lesson.quiz_results.unwrap().total_quizzes, 3);
        assert_eq!(progress.chapter("intro").unwrap().quiz_summary.unwrap().total_passed, 2);
    }

    #[test]
    fn summary_percentage_is_zero_without_quizzes() {
        let lessons = [LessonProgress::new("A"), LessonProgress::new("B")];
        let summary = QuizSummary::from_lessons(&lessons);
        assert_eq!(summary.total_quizzes, 0);
        assert_eq!(summary.percentage, 0.0);
    }

    #[test]
    fn summary_aggregates_lessons() {
        let mut a = LessonProgress::new("A");
        let mut results = QuizResults::default();
        results.record(true);
        results.record(true);
        results.record(false);
        a.quiz_results = Some(results);
        let mut b = LessonProgress::new("B");
        let mut results = QuizResults::default();
        results.record(true);
        b.quiz_results = Some(results);

        let summary = QuizSummary::from_lessons([&a, &b]);
        assert_eq!(summary.total_passed, 3);
        assert_eq!(summary.total_failed, 1);
        assert_eq!(summary.total_quizzes, 4);
        assert_eq!(summary.percentage, 75.0);
    }

    #[test]
    fn quiz_counters_saturate() {
        let mut results = QuizResults {
            passed: u32::MAX,
            failed: 0,
            total_quizzes: u32::MAX,
        };
        results.record(true);
        assert_eq!(results.passed, u32::MAX);
        assert_eq!(results.total_quizzes, u32::MAX);

        let mut a = LessonProgress::new("A");
        a.quiz_results = Some(results);
        let summary = QuizSummary::from_lessons([&a, &a]);
        assert_eq!(summary.total_quizzes, u32::MAX);
        assert_eq!(summary.percentage, 100.0);
    }

    #[test]
    fn completed_wins_over_skipped_in_rollups() {
        let mut progress = CourseProgress::default();
        let mut chapter = ChapterProgress {
            title: "Intro".into(),
            ..ChapterProgress::default()
        };
        let mut both = LessonProgress::new("A");
        both.completed = true;
        both.skipped = true;
        let mut skipped = LessonProgress::new("B");
        skipped.skipped = true;
        chapter.lessons.insert("a".into(), both);
        chapter.lessons.insert("b".into(), skipped);
        chapter.lessons.insert("c".into(), LessonProgress::new("C"));
        progress.chapters.insert("intro".into(), chapter);

        progress.update_totals();
        assert_eq!((progress.completed, progress.skipped, progress.total), (1, 1, 3));
    }
}
