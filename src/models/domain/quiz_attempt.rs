use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::dto::wire::{self, FromWire};
use crate::services::grading::POINTS_PER_QUESTION;

/// One quiz submission as returned by the score endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Option<String>,
    pub subject_id: String,
    pub subject_title: Option<String>,
    pub class_id: Option<String>,
    pub points: f64,
    pub total_questions: f64,
    pub correct_answers: f64,
    pub meta: AttemptMeta,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptMeta {
    pub max_points: f64,
    pub wrong_questions: Vec<WrongQuestion>,
    pub answers: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

impl QuizAttempt {
    pub fn new(subject_id: &str, points: f64, total_questions: f64) -> Self {
        QuizAttempt {
            id: None,
            subject_id: subject_id.to_string(),
            subject_title: None,
            class_id: None,
            points,
            total_questions,
            correct_answers: points / POINTS_PER_QUESTION,
            meta: AttemptMeta::default(),
            submitted_at: None,
        }
    }

    pub fn with_wrong_questions(mut self, questions: &[&str]) -> Self {
        self.meta.wrong_questions = questions
            .iter()
            .map(|q| WrongQuestion {
                question: q.to_string(),
                subject_id: None,
            })
            .collect();
        self
    }

    /// `meta.maxPoints`, else `totalQuestions × 20`.
    pub fn max_points(&self) -> f64 {
        if self.meta.max_points > 0.0 {
            self.meta.max_points
        } else {
            self.total_questions * POINTS_PER_QUESTION
        }
    }

    /// Attempts without a positive maximum cannot be graded.
    pub fn is_eligible(&self) -> bool {
        self.max_points() > 0.0
    }
}

impl FromWire for WrongQuestion {
    fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(WrongQuestion {
                question: s.clone(),
                subject_id: None,
            }),
            Value::Object(_) => Some(WrongQuestion {
                question: wire::text_field(value, &["question", "text", "title"])?,
                subject_id: wire::reference_id(value, "subjectId"),
            }),
            _ => None,
        }
    }
}

impl FromWire for AttemptMeta {
    fn from_wire(value: &Value) -> Option<Self> {
        let wrong_questions = value
            .get("wrongQuestions")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().filter_map(WrongQuestion::from_wire).collect())
            .unwrap_or_default();

        Some(AttemptMeta {
            max_points: wire::number_field(value, &["maxPoints"]),
            wrong_questions,
            answers: value.get("answers").cloned().unwrap_or(Value::Null),
        })
    }
}

impl FromWire for QuizAttempt {
    fn from_wire(value: &Value) -> Option<Self> {
        let subject_id = wire::reference_id(value, "subjectId")?;
        let subject_title = value
            .get("subjectId")
            .filter(|s| s.is_object())
            .and_then(|s| wire::text_field(s, &["title", "name"]))
            .or_else(|| wire::text_field(value, &["subjectTitle"]));

        let submitted_at = wire::date_field(value, &["submittedAt", "createdAt"]);

        Some(QuizAttempt {
            id: wire::id_of(value),
            subject_id,
            subject_title,
            class_id: wire::reference_id(value, "classId"),
            points: wire::number_field(value, &["points"]),
            total_questions: wire::number_field(value, &["totalQuestions"]),
            correct_answers: wire::number_field(value, &["correctAnswers"]),
            meta: value
                .get("meta")
                .and_then(AttemptMeta::from_wire)
                .unwrap_or_default(),
            submitted_at,
        })
    }
}
