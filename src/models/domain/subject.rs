use serde::Serialize;
use serde_json::Value;

use crate::models::domain::quiz_question::QuizQuestion;
use crate::models::dto::wire::{self, FromWire};

pub const DEFAULT_SUBJECT_TITLE: &str = "Cours";

/// A chapter of a class, optionally carrying a quiz.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub class_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub quiz_questions: Vec<QuizQuestion>,
}

impl Subject {
    pub fn new(id: &str, class_id: &str, title: &str) -> Self {
        Subject {
            id: id.to_string(),
            class_id: Some(class_id.to_string()),
            title: title.to_string(),
            description: None,
            quiz_questions: Vec::new(),
        }
    }

    pub fn with_questions(mut self, questions: Vec<QuizQuestion>) -> Self {
        self.quiz_questions = questions;
        self
    }

    pub fn has_quiz(&self) -> bool {
        !self.quiz_questions.is_empty()
    }
}

impl FromWire for Subject {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let quiz_questions = ["quizQuestions", "questions"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_array))
            .map(|raw| raw.iter().filter_map(QuizQuestion::from_wire).collect())
            .unwrap_or_default();

        Some(Subject {
            id: wire::id_of(value)?,
            class_id: wire::reference_id(value, "classId")
                .or_else(|| wire::reference_id(value, "class")),
            title: wire::text_field(value, &["title", "name"])
                .unwrap_or_else(|| DEFAULT_SUBJECT_TITLE.to_string()),
            description: wire::text_field(value, &["description", "content"]),
            quiz_questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_from_wire() {
        let subject = Subject::from_wire(&json!({
            "_id": "s1",
            "classId": {"_id": "c1", "name": "3M2"},
            "title": "Optique",
            "quizQuestions": [
                {"question": "Q1", "options": ["a", "b", "c", "d"], "answers": ["a"]}
            ]
        }))
        .unwrap();

        assert_eq!(subject.id, "s1");
        assert_eq!(subject.class_id.as_deref(), Some("c1"));
        assert_eq!(subject.title, "Optique");
        assert!(subject.has_quiz());
    }

    #[test]
    fn test_bare_string_is_not_a_subject() {
        assert_eq!(Subject::from_wire(&json!("ok")), None);
        assert_eq!(Subject::from_wire(&json!("<html>Erreur</html>")), None);
    }

    #[test]
    fn test_subject_defaults() {
        let subject = Subject::from_wire(&json!({"id": "s2", "classId": "c9", "questions": []})).unwrap();
        assert_eq!(subject.title, DEFAULT_SUBJECT_TITLE);
        assert_eq!(subject.class_id.as_deref(), Some("c9"));
        assert!(!subject.has_quiz());
    }
}
