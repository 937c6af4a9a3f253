//! Course structure derived from lesson metadata.
//!
//! The content loader hands over one [`LessonEntry`] per lesson; these helpers
//! order them by chapter and lesson, group them into chapters and compute
//! navigation links.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Path prefix every lesson page lives under.
pub const COURSE_BASE_PATH: &str = "/d3-course/";

/// Lesson metadata as provided by the content loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonEntry {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub chapter: String,
    pub chapter_title: String,
    pub chapter_order: u32,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonData {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub href: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterData {
    pub slug: String,
    pub title: String,
    pub order: u32,
    pub lessons: Vec<LessonData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonLink {
    pub href: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonNavigation {
    pub prev: Option<LessonLink>,
    pub next: Option<LessonLink>,
}

pub fn lesson_href(slug: &str) -> String {
    format!("{COURSE_BASE_PATH}{slug}")
}

/// Lessons in reading order: by chapter order, then lesson order. Ties keep
/// their input order.
pub fn reading_order(entries: &[LessonEntry]) -> Vec<&LessonEntry> {
    let mut sorted: Vec<&LessonEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| (entry.chapter_order, entry.order));
    sorted
}

/// Group lessons into chapters, both in reading order. A chapter takes its
/// title and order from its first lesson in reading order.
pub fn course_structure(entries: &[LessonEntry]) -> Vec<ChapterData> {
    let mut chapters: Vec<ChapterData> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in reading_order(entries) {
        let slot = *index.entry(entry.chapter.as_str()).or_insert_with(|| {
            chapters.push(ChapterData {
                slug: entry.chapter.clone(),
                title: entry.chapter_title.clone(),
                order: entry.chapter_order,
                lessons: Vec::new(),
            });
            chapters.len() - 1
        });
        chapters[slot].lessons.push(LessonData {
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            description: entry.description.clone(),
            href: lesson_href(&entry.slug),
            order: entry.order,
        });
    }

    chapters.sort_by_key(|chapter| chapter.order);
    chapters
}

/// Previous and next lesson around `current_slug` in reading order. An
/// unknown slug has neither.
pub fn lesson_navigation(entries: &[LessonEntry], current_slug: &str) -> LessonNavigation {
    let sorted = reading_order(entries);
    let Some(idx) = sorted.iter().position(|entry| entry.slug == current_slug) else {
        return LessonNavigation::default();
    };
    let link = |entry: &LessonEntry| LessonLink {
        href: lesson_href(&entry.slug),
        title: entry.title.clone(),
    };

    LessonNavigation {
        prev: idx.checked_sub(1).map(|prev| link(sorted[prev])),
        next: sorted.get(idx + 1).map(|entry| link(*entry)),
    }
}

/// Lessons of one chapter, by lesson order.
pub fn chapter_lessons<'a>(entries: &'a [LessonEntry], chapter: &str) -> Vec<&'a LessonEntry> {
    let mut lessons: Vec<&LessonEntry> = entries
        .iter()
        .filter(|entry| entry.chapter == chapter)
        .collect();
    lessons.sort_by_key(|entry| entry.order);
    lessons
}

/// Link to the first lesson of the chapter after `current_chapter`. `None`
/// for the last chapter or an unknown one.
pub fn next_chapter(entries: &[LessonEntry], current_chapter: &str) -> Option<LessonLink> {
    let structure = course_structure(entries);
    let idx = structure
        .iter()
        .position(|chapter| chapter.slug == current_chapter)?;
    let next = structure.get(idx + 1)?;
    let first = next.lessons.first()?;
    Some(LessonLink {
        href: first.href.clone(),
        title: next.title.clone(),
    })
}
