use serde::Serialize;
use serde_json::Value;

use crate::models::dto::wire::{self, FromWire};

pub const DEFAULT_CHAPTER_TITLE: &str = "Chapitre";

/// A wrong answer recorded by the backend for the signed-in student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    pub question: String,
    pub selected_option_text: Option<String>,
    pub correct_option_text: Option<String>,
    pub subject_id: Option<String>,
    pub subject_title: String,
    pub attempt_number: u32,
    pub class_id: String,
}

impl Mistake {
    fn from_wire_in(value: &Value, class_id: &str) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let attempt_number = wire::number_field(value, &["attemptNumber"]);

        Some(Mistake {
            question: wire::text_field(value, &["question", "questionText"])
                .unwrap_or_else(|| "Question".to_string()),
            selected_option_text: wire::text_field(value, &["selectedOptionText", "selectedAnswer"]),
            correct_option_text: wire::text_field(value, &["correctOptionText", "correctAnswer"]),
            subject_id: wire::reference_id(value, "subjectId"),
            subject_title: wire::text_field(value, &["subjectTitle", "subjectName"])
                .unwrap_or_else(|| DEFAULT_CHAPTER_TITLE.to_string()),
            attempt_number: if attempt_number >= 1.0 { attempt_number as u32 } else { 1 },
            class_id: class_id.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub class_id: String,
    pub class_name: Option<String>,
}

/// `GET /quizzes/me/mistakes`, in backend order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeReport {
    pub classes: Vec<ClassRef>,
    pub by_class: Vec<(String, Vec<Mistake>)>,
}

impl MistakeReport {
    pub fn mistakes_for(&self, class_id: &str) -> &[Mistake] {
        self.by_class
            .iter()
            .find(|(id, _)| id == class_id)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &Mistake> {
        self.by_class.iter().flat_map(|(_, items)| items.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.iter().all(|(_, items)| items.is_empty())
    }
}

impl FromWire for MistakeReport {
    fn from_wire(value: &Value) -> Option<Self> {
        let classes = value
            .get("classes")
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .filter_map(|c| {
                        Some(ClassRef {
                            class_id: wire::string_field(c, &["classId", "_id", "id"])?,
                            class_name: wire::text_field(c, &["className", "name"]),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let by_class = value
            .get("mistakesByClass")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(class_id, items)| {
                        let mistakes = items
                            .as_array()
                            .map(|raw| {
                                raw.iter()
                                    .filter_map(|m| Mistake::from_wire_in(m, class_id))
                                    .collect()
                            })
                            .unwrap_or_default();
                        (class_id.clone(), mistakes)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(MistakeReport { classes, by_class })
    }
}
