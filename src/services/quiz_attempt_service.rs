use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuizQuestion, Subject},
        dto::quiz_dto::{SubmissionMeta, SubmitQuizRequest, WrongQuestionDto},
    },
    repositories::{QuizAttemptRepository, SubjectRepository},
    services::{
        answer_resolver::{resolve, Resolution},
        grading::{grade_on_six, POINTS_PER_QUESTION},
    },
};

pub const EMPTY_QUIZ: &str = "Aucune question disponible pour ce cours.";

/// A student working through one chapter's quiz. The first pick on a
/// question is final.
#[derive(Debug, Clone)]
pub struct QuizRun {
    subject_id: String,
    class_id: Option<String>,
    title: String,
    questions: Vec<QuizQuestion>,
    resolutions: Vec<Resolution>,
    current: usize,
    picks: BTreeMap<usize, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    pub points: f64,
    pub max_points: f64,
    pub grade: f64,
    pub percent: u32,
}

impl QuizRun {
    pub fn new(subject: &Subject, class_id: Option<&str>) -> Self {
        let questions = subject.quiz_questions.clone();
        let resolutions = questions.iter().map(resolve).collect();
        Self {
            subject_id: subject.id.clone(),
            class_id: class_id
                .map(str::to_string)
                .or_else(|| subject.class_id.clone()),
            title: subject.title.clone(),
            questions,
            resolutions,
            current: 0,
            picks: BTreeMap::new(),
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// Correct option of the current question, for feedback once locked.
    pub fn current_resolution(&self) -> Resolution {
        self.resolutions
            .get(self.current)
            .copied()
            .unwrap_or(Resolution::Unresolved)
    }

    pub fn picked(&self, question: usize) -> Option<usize> {
        self.picks.get(&question).copied()
    }

    pub fn is_locked(&self, question: usize) -> bool {
        self.picks.contains_key(&question)
    }

    /// Records a pick on the current question. Returns `false` when the
    /// question was already answered.
    pub fn select(&mut self, option: usize) -> AppResult<bool> {
        let question = self
            .current_question()
            .ok_or_else(|| AppError::validation(EMPTY_QUIZ))?;
        if option >= question.options.len() {
            return Err(AppError::validation(format!("Option {} inexistante", option + 1)));
        }
        if self.is_locked(self.current) {
            return Ok(false);
        }
        self.picks.insert(self.current, option);
        Ok(true)
    }

    pub fn can_advance(&self) -> bool {
        self.is_locked(self.current)
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1).min(self.total().saturating_sub(1));
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.total()
    }

    /// `None` while unanswered.
    pub fn is_correct(&self, question: usize) -> Option<bool> {
        let picked = self.picked(question)?;
        let correct = match self.resolutions.get(question)? {
            Resolution::Resolved(index) => *index == picked,
            Resolution::Unresolved => self.questions[question]
                .options
                .get(picked)
                .map(|o| o.flagged_correct)
                .unwrap_or(false),
        };
        Some(correct)
    }

    pub fn correct_count(&self) -> usize {
        (0..self.total())
            .filter(|i| self.is_correct(*i) == Some(true))
            .count()
    }

    pub fn wrong_questions(&self) -> Vec<WrongQuestionDto> {
        (0..self.total())
            .filter(|i| self.is_correct(*i) == Some(false))
            .map(|i| WrongQuestionDto {
                question: self.questions[i].question.clone(),
                subject_id: Some(self.subject_id.clone()),
            })
            .collect()
    }

    pub fn submission(&self) -> AppResult<SubmitQuizRequest> {
        if self.is_empty() {
            return Err(AppError::validation(EMPTY_QUIZ));
        }
        let total = self.total() as u32;
        let request = SubmitQuizRequest {
            total_questions: total,
            correct_answers: self.correct_count() as u32,
            class_id: self.class_id.clone(),
            meta: SubmissionMeta {
                answers: self.picks.clone(),
                max_points: total * POINTS_PER_QUESTION as u32,
                wrong_questions: self.wrong_questions(),
            },
        };
        request.validate()?;
        Ok(request)
    }

    pub fn summary(&self) -> QuizSummary {
        let total = self.total();
        let correct = self.correct_count();
        let points = correct as f64 * POINTS_PER_QUESTION;
        let max_points = total as f64 * POINTS_PER_QUESTION;
        QuizSummary {
            correct,
            total,
            points,
            max_points,
            grade: grade_on_six(points, max_points),
            percent: if total == 0 {
                0
            } else {
                (correct as f64 / total as f64 * 100.0).round() as u32
            },
        }
    }
}

pub struct QuizAttemptService {
    subjects: Arc<dyn SubjectRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizAttemptService {
    pub fn new(subjects: Arc<dyn SubjectRepository>, attempts: Arc<dyn QuizAttemptRepository>) -> Self {
        Self { subjects, attempts }
    }

    pub async fn start(&self, subject_id: &str, class_id: Option<&str>) -> AppResult<QuizRun> {
        if subject_id.trim().is_empty() {
            return Err(AppError::validation("subjectId manquant"));
        }
        let subject = self.subjects.get(subject_id).await?;
        Ok(QuizRun::new(&subject, class_id))
    }

    pub async fn submit(&self, run: &QuizRun) -> AppResult<QuizSummary> {
        let request = run.submission()?;
        self.attempts.submit(run.subject_id(), &request).await?;
        Ok(run.summary())
    }
}
