use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::domain::quiz_question::QuizQuestionPayload;
use crate::models::dto::request::UploadFile;

pub const MIN_GENERATED_QUESTIONS: u32 = 1;
pub const MAX_GENERATED_QUESTIONS: u32 = 50;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrongQuestionDto {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    /// Question index → chosen option index.
    pub answers: BTreeMap<usize, usize>,
    pub max_points: u32,
    pub wrong_questions: Vec<WrongQuestionDto>,
}

/// Body of `POST /quizzes/:subjectId/submit`.
#[derive(Debug, Clone, Serialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_submission_counts"))]
pub struct SubmitQuizRequest {
    #[validate(range(min = 1, message = "Quiz sans question"))]
    pub total_questions: u32,
    pub correct_answers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub meta: SubmissionMeta,
}

fn validate_submission_counts(request: &SubmitQuizRequest) -> Result<(), ValidationError> {
    if request.correct_answers > request.total_questions {
        return Err(ValidationError::new("correct_answers_exceed_total"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// The backend speaks French here.
    pub fn as_api(&self) -> &'static str {
        match self {
            Difficulty::Easy => "facile",
            Difficulty::Medium => "moyen",
            Difficulty::Hard => "difficile",
        }
    }
}

/// Multipart body of `POST /subjects/class/:classId`.
#[derive(Debug, Clone, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, message = "Titre requis"))]
    pub title: String,
    pub description: String,
    pub file: Option<UploadFile>,
    pub auto_generate_quiz: bool,
    pub quiz_question_count: u32,
    pub difficulty: Difficulty,
}

impl CreateSubjectRequest {
    pub fn new(title: &str, description: &str) -> Self {
        CreateSubjectRequest {
            title: title.trim().to_string(),
            description: description.to_string(),
            file: None,
            auto_generate_quiz: true,
            quiz_question_count: 10,
            difficulty: Difficulty::default(),
        }
    }

    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_question_count(mut self, count: i64) -> Self {
        self.quiz_question_count = count.clamp(
            MIN_GENERATED_QUESTIONS as i64,
            MAX_GENERATED_QUESTIONS as i64,
        ) as u32;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// Body of `PUT /subjects/:id`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "Ajoute au moins une question."))]
    pub quiz_questions: Vec<QuizQuestionPayload>,
    pub quiz_question_count: usize,
}

impl UpdateSubjectRequest {
    pub fn new(title: &str, description: &str, quiz_questions: Vec<QuizQuestionPayload>) -> Self {
        UpdateSubjectRequest {
            title: title.to_string(),
            description: description.to_string(),
            quiz_question_count: quiz_questions.len(),
            quiz_questions,
        }
    }
}
