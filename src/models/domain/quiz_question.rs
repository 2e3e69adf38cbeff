use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::dto::wire::{self, FromWire};

pub const OPTION_LIST_KEYS: &[&str] = &["options", "choices", "proposals"];
pub const OPTION_LABEL_KEYS: &[&str] = &[
    "text", "label", "answer", "content", "value", "title", "name", "option",
];
pub const OPTION_FLAG_KEYS: &[&str] = &["isCorrect", "correct", "isAnswer", "right", "isRight", "valid"];
pub const INDEX_KEYS: &[&str] = &[
    "correctIndex",
    "answerIndex",
    "rightIndex",
    "correctOptionIndex",
    "correctAnswerIndex",
    "correct",
    "right",
];
pub const REFERENCE_KEYS: &[&str] = &[
    "correctAnswer",
    "answer",
    "solution",
    "rightAnswer",
    "correctOption",
    "correctOptionId",
    "correctAnswerId",
];
const REFERENCE_TEXT_KEYS: &[&str] = &["text", "label", "answer", "content", "value"];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: Option<String>,
    pub label: String,
    pub flagged_correct: bool,
}

impl QuizOption {
    pub fn text(label: &str) -> Self {
        QuizOption {
            id: None,
            label: label.to_string(),
            flagged_correct: false,
        }
    }

    fn from_wire_at(value: &Value, index: usize) -> Self {
        let fallback = || format!("Option {}", index + 1);
        match value {
            Value::String(s) => QuizOption::text(s),
            Value::Object(_) => QuizOption {
                id: wire::string_field(value, &["_id", "id", "optionId"]).filter(|s| !s.is_empty()),
                label: wire::string_field(value, OPTION_LABEL_KEYS).unwrap_or_else(fallback),
                flagged_correct: wire::bool_field(value, OPTION_FLAG_KEYS),
            },
            _ => QuizOption::text(&fallback()),
        }
    }
}

/// Where a question points at its correct option when `answers` is absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AnswerReference {
    Number { value: f64 },
    Text { value: String },
    Option { id: Option<String>, text: Option<String> },
}

impl AnswerReference {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|value| AnswerReference::Number { value }),
            Value::String(s) => Some(AnswerReference::Text { value: s.clone() }),
            Value::Object(_) => Some(AnswerReference::Option {
                id: wire::string_field(value, &["_id", "id"]).filter(|s| !s.is_empty()),
                text: wire::string_field(value, REFERENCE_TEXT_KEYS),
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<QuizOption>,
    /// Backend v2 stores the correct option's text in `answers[0]`.
    pub answers: Vec<String>,
    pub index_hint: Option<f64>,
    pub reference: Option<AnswerReference>,
}

impl QuizQuestion {
    pub fn new(question: &str, options: &[&str], answer: &str) -> Self {
        QuizQuestion {
            question: question.to_string(),
            options: options.iter().map(|o| QuizOption::text(o)).collect(),
            answers: vec![answer.to_string()],
            index_hint: None,
            reference: None,
        }
    }

    pub fn option_labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }
}

impl FromWire for QuizQuestion {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }

        let options = wire::first_field(value, OPTION_LIST_KEYS)
            .and_then(Value::as_array)
            .map(|raw| {
                raw.iter()
                    .enumerate()
                    .map(|(i, o)| QuizOption::from_wire_at(o, i))
                    .collect()
            })
            .unwrap_or_default();

        let answers = value
            .get("answers")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().filter_map(wire::scalar_string).collect())
            .unwrap_or_default();

        let index_hint = match wire::first_field(value, INDEX_KEYS) {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        };

        Some(QuizQuestion {
            question: wire::text_field(value, &["question", "text", "title"])
                .unwrap_or_else(|| "Question".to_string()),
            options,
            answers,
            index_hint,
            reference: wire::first_field(value, REFERENCE_KEYS).and_then(AnswerReference::from_wire),
        })
    }
}

/// Wire shape used when a teacher saves a quiz: four options, one answer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestionPayload {
    pub question: String,
    pub options: Vec<String>,
    pub answers: Vec<String>,
}

impl From<&QuizQuestionPayload> for QuizQuestion {
    fn from(payload: &QuizQuestionPayload) -> Self {
        QuizQuestion {
            question: payload.question.clone(),
            options: payload.options.iter().map(|o| QuizOption::text(o)).collect(),
            answers: payload.answers.clone(),
            index_hint: None,
            reference: None,
        }
    }
}

impl From<&QuizQuestion> for QuizQuestionPayload {
    fn from(question: &QuizQuestion) -> Self {
        QuizQuestionPayload {
            question: question.question.clone(),
            options: question.option_labels(),
            answers: question.answers.clone(),
        }
    }
}
