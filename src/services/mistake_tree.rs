//! Class → chapter → mistake grouping for the progress page.

use serde::Serialize;

use crate::models::domain::{class::DEFAULT_CLASS_NAME, Mistake};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMistakes {
    pub key: String,
    pub title: String,
    pub items: Vec<Mistake>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMistakes {
    pub class_id: String,
    pub class_name: String,
    pub chapters: Vec<ChapterMistakes>,
}

impl ClassMistakes {
    pub fn total(&self) -> usize {
        self.chapters.iter().map(|c| c.items.len()).sum()
    }
}

/// Mistakes of one chapter share the subject id; records without one fall
/// back to their trimmed, lowercased title.
pub fn chapter_key(mistake: &Mistake) -> String {
    match mistake.subject_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => mistake.subject_title.trim().to_lowercase(),
    }
}

/// Groups one class's mistakes by chapter, largest chapter first. Ties keep
/// the order chapters first appeared in.
pub fn group_chapters<'a, I>(mistakes: I) -> Vec<ChapterMistakes>
where
    I: IntoIterator<Item = &'a Mistake>,
{
    let mut chapters: Vec<ChapterMistakes> = Vec::new();
    for mistake in mistakes {
        let key = chapter_key(mistake);
        match chapters.iter_mut().find(|c| c.key == key) {
            Some(chapter) => chapter.items.push(mistake.clone()),
            None => chapters.push(ChapterMistakes {
                key,
                title: mistake.subject_title.clone(),
                items: vec![mistake.clone()],
            }),
        }
    }
    chapters.sort_by(|a, b| b.items.len().cmp(&a.items.len()));
    chapters
}

/// Builds the two-level tree. `by_class` is taken in backend order and
/// `class_name` resolves display names; classes without mistakes are left
/// out.
pub fn build_tree<F>(by_class: &[(String, Vec<Mistake>)], class_name: F) -> Vec<ClassMistakes>
where
    F: Fn(&str) -> Option<String>,
{
    let mut classes: Vec<ClassMistakes> = by_class
        .iter()
        .filter(|(class_id, items)| !class_id.is_empty() && !items.is_empty())
        .map(|(class_id, items)| ClassMistakes {
            class_id: class_id.clone(),
            class_name: class_name(class_id).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string()),
            chapters: group_chapters(items),
        })
        .collect();
    classes.sort_by(|a, b| b.total().cmp(&a.total()));
    classes
}
