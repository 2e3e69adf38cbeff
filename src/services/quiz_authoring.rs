use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{quiz_question::QuizQuestionPayload, Subject},
        dto::{
            quiz_dto::{CreateSubjectRequest, UpdateSubjectRequest},
            request::UploadFile,
        },
    },
    repositories::SubjectRepository,
    services::validation::{require_text, validate_document},
};

pub const OPTIONS_PER_QUESTION: usize = 4;
pub const DEFAULT_QUESTION: &str = "Question";

fn default_option(index: usize) -> String {
    format!("Option {}", index + 1)
}

/// Pads or truncates to four options; keeps the answer only if it is one
/// of them.
pub fn ensure_four_options(question: &QuizQuestionPayload) -> QuizQuestionPayload {
    let mut options = question.options.clone();
    options.resize(OPTIONS_PER_QUESTION, String::new());

    let answers = match question.answers.first() {
        Some(answer) if !answer.is_empty() && options.contains(answer) => vec![answer.clone()],
        _ => Vec::new(),
    };

    QuizQuestionPayload {
        question: question.question.clone(),
        options,
        answers,
    }
}

/// Shape sent on save: no blank text, exactly one valid answer.
pub fn normalize_for_save(question: &QuizQuestionPayload) -> QuizQuestionPayload {
    let options: Vec<String> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let trimmed = o.trim();
            if trimmed.is_empty() {
                default_option(i)
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    let answer = question
        .answers
        .first()
        .filter(|a| !a.is_empty() && options.contains(*a))
        .cloned()
        .or_else(|| options.first().cloned());

    let question_text = question.question.trim();
    QuizQuestionPayload {
        question: if question_text.is_empty() {
            DEFAULT_QUESTION.to_string()
        } else {
            question_text.to_string()
        },
        answers: answer.into_iter().collect(),
        options,
    }
}

/// In-progress edit of a chapter's quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizDraft {
    pub subject_id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<QuizQuestionPayload>,
}

impl QuizDraft {
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            subject_id: subject.id.clone(),
            title: subject.title.clone(),
            description: subject.description.clone().unwrap_or_default(),
            questions: subject
                .quiz_questions
                .iter()
                .map(|q| ensure_four_options(&QuizQuestionPayload::from(q)))
                .collect(),
        }
    }

    fn question_mut(&mut self, index: usize) -> AppResult<&mut QuizQuestionPayload> {
        self.questions
            .get_mut(index)
            .ok_or_else(|| AppError::validation(format!("Question {} inexistante", index + 1)))
    }

    pub fn set_question_text(&mut self, index: usize, text: &str) -> AppResult<()> {
        self.question_mut(index)?.question = text.to_string();
        Ok(())
    }

    /// The answer follows the option it pointed at.
    pub fn rename_option(&mut self, index: usize, option: usize, text: &str) -> AppResult<()> {
        let question = self.question_mut(index)?;
        let mut next = ensure_four_options(question);
        let slot = next
            .options
            .get_mut(option)
            .ok_or_else(|| AppError::validation(format!("Option {} inexistante", option + 1)))?;
        let old = std::mem::replace(slot, text.to_string());
        if next.answers.first() == Some(&old) {
            next.answers = vec![text.to_string()];
        }
        *question = next;
        Ok(())
    }

    pub fn mark_correct(&mut self, index: usize, option: usize) -> AppResult<()> {
        let question = self.question_mut(index)?;
        let mut next = ensure_four_options(question);
        let label = next
            .options
            .get(option)
            .cloned()
            .ok_or_else(|| AppError::validation(format!("Option {} inexistante", option + 1)))?;
        next.answers = vec![label];
        *question = next;
        Ok(())
    }

    pub fn add_question(&mut self) {
        let options: Vec<String> = (0..OPTIONS_PER_QUESTION).map(default_option).collect();
        self.questions.push(QuizQuestionPayload {
            question: String::new(),
            answers: vec![options[0].clone()],
            options,
        });
    }

    pub fn remove_question(&mut self, index: usize) -> AppResult<()> {
        if index >= self.questions.len() {
            return Err(AppError::validation(format!("Question {} inexistante", index + 1)));
        }
        self.questions.remove(index);
        Ok(())
    }

    pub fn to_request(&self) -> AppResult<UpdateSubjectRequest> {
        let request = UpdateSubjectRequest::new(
            &self.title,
            &self.description,
            self.questions.iter().map(normalize_for_save).collect(),
        );
        request.validate()?;
        Ok(request)
    }
}

/// Chapter creation and quiz editing for teachers.
pub struct QuizAuthoringService {
    subjects: Arc<dyn SubjectRepository>,
}

impl QuizAuthoringService {
    pub fn new(subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { subjects }
    }

    pub fn check_document(file: &UploadFile) -> AppResult<()> {
        validate_document(file)
    }

    /// The created chapter, when the backend echoes it back.
    pub async fn create_chapter(&self, class_id: &str, request: CreateSubjectRequest) -> AppResult<Option<Subject>> {
        require_text(class_id, "Classe manquante")?;
        request.validate()?;
        if let Some(file) = &request.file {
            validate_document(file)?;
        }
        self.subjects.create_in_class(class_id, &request).await
    }

    pub async fn load_draft(&self, subject_id: &str) -> AppResult<QuizDraft> {
        let subject = self.subjects.get(subject_id).await?;
        Ok(QuizDraft::from_subject(&subject))
    }

    pub async fn save_draft(&self, draft: &QuizDraft) -> AppResult<Subject> {
        let request = draft.to_request()?;
        let subject = self.subjects.update(&draft.subject_id, &request).await?;
        log::info!(
            "Saved quiz of chapter {} ({} questions)",
            draft.subject_id,
            request.quiz_question_count
        );
        Ok(subject)
    }

    pub async fn delete_chapter(&self, subject_id: &str) -> AppResult<()> {
        self.subjects.delete(subject_id).await
    }
}
