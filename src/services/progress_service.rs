use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::{
    errors::AppResult,
    models::domain::{class::DEFAULT_CLASS_NAME, Class, MistakeReport, QuizAttempt, Subject},
    repositories::{ClassRepository, QuizAttemptRepository, SubjectRepository},
    services::{
        grading::{average, is_complete, round_to_tenth, tally_by_subject},
        mistake_tree::{build_tree, ClassMistakes},
    },
};

pub const ALL_CLASSES_LABEL: &str = "Toutes les classes";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgressScope {
    #[default]
    AllClasses,
    Class(String),
}

impl ProgressScope {
    pub fn includes(&self, class_id: &str) -> bool {
        match self {
            ProgressScope::AllClasses => true,
            ProgressScope::Class(id) => id == class_id,
        }
    }
}

/// One chapter in the student's course list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub key: String,
    pub class_id: String,
    pub subject_id: String,
    pub title: String,
    /// Rounded to a tenth; `None` until attempted.
    pub grade: Option<f64>,
    pub attempts: u32,
}

impl CourseRow {
    pub fn is_done(&self) -> bool {
        self.grade.map(is_complete).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub scope_label: String,
    pub courses: Vec<CourseRow>,
    pub total_quizzes: usize,
    pub done_quizzes: usize,
    pub average: Option<f64>,
    pub mistakes: Vec<ClassMistakes>,
}

/// Reshapes already fetched data; `subjects_by_class` holds only classes in
/// scope.
pub fn build_progress(
    scope: &ProgressScope,
    classes: &[Class],
    subjects_by_class: &[(String, Vec<Subject>)],
    scores: &[QuizAttempt],
    report: &MistakeReport,
) -> StudentProgress {
    let class_name = |class_id: &str| -> Option<String> {
        classes
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| c.name.clone())
            .or_else(|| {
                report
                    .classes
                    .iter()
                    .find(|c| c.class_id == class_id)
                    .and_then(|c| c.class_name.clone())
            })
    };

    let in_scope: HashSet<&str> = subjects_by_class
        .iter()
        .flat_map(|(_, subjects)| subjects.iter().map(|s| s.id.as_str()))
        .collect();
    let tallies = tally_by_subject(scores.iter().filter(|a| in_scope.contains(a.subject_id.as_str())));

    let mut courses = Vec::new();
    for (class_id, subjects) in subjects_by_class {
        let class_label = class_name(class_id).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());
        for subject in subjects {
            let tally = tallies.get(&subject.id);
            courses.push(CourseRow {
                key: format!("{}:{}", class_id, subject.id),
                class_id: class_id.clone(),
                subject_id: subject.id.clone(),
                title: match scope {
                    ProgressScope::AllClasses => format!("{} · {}", class_label, subject.title),
                    ProgressScope::Class(_) => subject.title.clone(),
                },
                grade: tally.and_then(|t| t.grade()).map(round_to_tenth),
                attempts: tally.map(|t| t.attempts).unwrap_or(0),
            });
        }
    }

    let graded: Vec<f64> = courses.iter().filter_map(|c| c.grade).collect();
    let mistakes_in_scope: Vec<_> = report
        .by_class
        .iter()
        .filter(|(class_id, _)| scope.includes(class_id))
        .cloned()
        .collect();

    StudentProgress {
        scope_label: match scope {
            ProgressScope::AllClasses => ALL_CLASSES_LABEL.to_string(),
            ProgressScope::Class(id) => class_name(id).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string()),
        },
        total_quizzes: courses.len(),
        done_quizzes: courses.iter().filter(|c| c.is_done()).count(),
        average: average(&graded).map(round_to_tenth),
        mistakes: build_tree(&mistakes_in_scope, class_name),
        courses,
    }
}

/// Progress page of the signed-in student.
pub struct ProgressService {
    classes: Arc<dyn ClassRepository>,
    subjects: Arc<dyn SubjectRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl ProgressService {
    pub fn new(
        classes: Arc<dyn ClassRepository>,
        subjects: Arc<dyn SubjectRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self {
            classes,
            subjects,
            attempts,
        }
    }

    pub async fn progress(&self, scope: &ProgressScope) -> AppResult<StudentProgress> {
        let classes = self.classes.list().await?;
        let class_ids: Vec<String> = match scope {
            ProgressScope::AllClasses => classes.iter().map(|c| c.id.clone()).collect(),
            ProgressScope::Class(id) => vec![id.clone()],
        };

        let (scores, report) = tokio::try_join!(self.attempts.my_scores(), self.attempts.my_mistakes())?;
        let subjects_by_class = self.subjects_of(class_ids).await;

        let progress = build_progress(scope, &classes, &subjects_by_class, &scores, &report);
        log::debug!(
            "Progress for {}: {}/{} done over {} attempts",
            progress.scope_label,
            progress.done_quizzes,
            progress.total_quizzes,
            scores.len()
        );
        Ok(progress)
    }

    /// A class whose chapters fail to load contributes none.
    async fn subjects_of(&self, class_ids: Vec<String>) -> Vec<(String, Vec<Subject>)> {
        join_all(class_ids.into_iter().map(|class_id| async move {
            let subjects = match self.subjects.list_by_class(&class_id).await {
                Ok(subjects) => subjects,
                Err(e) => {
                    log::warn!("Could not load chapters of class {}: {}", class_id, e);
                    Vec::new()
                }
            };
            (class_id, subjects)
        }))
        .await
    }
}
