//! Teacher view over a class: averages, cohorts and hardest questions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::{
    errors::AppResult,
    models::{
        domain::{QuizAttempt, StudentSummary, Subject},
        dto::response::ServerClassInsights,
    },
    repositories::{ClassRepository, InsightsWindow, QuizAttemptRepository, SubjectRepository},
    services::grading::{average, average_grade, tally_by_subject},
    utils::worker_pool::map_bounded,
};

pub const STRUGGLING_BELOW: f64 = 4.0;
pub const BRILLIANT_ABOVE: f64 = 5.5;
pub const COHORT_LIMIT: usize = 10;
pub const HARD_QUESTION_RATE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInsight {
    pub student: StudentSummary,
    /// Mean grade over attempted chapters of the class.
    pub average: Option<f64>,
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardQuestion {
    pub subject_id: String,
    pub subject_title: Option<String>,
    pub question: String,
    pub wrong_students: usize,
    pub wrong_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInsights {
    pub class_id: String,
    pub students: Vec<StudentInsight>,
    pub class_average: Option<f64>,
    pub active_students: usize,
    pub struggling: Vec<StudentInsight>,
    pub brilliant: Vec<StudentInsight>,
    pub hardest_questions: Vec<HardQuestion>,
}

struct WrongTally {
    question: String,
    students: HashSet<String>,
}

/// Aggregates already fetched histories. Attempts outside the class's
/// chapters are ignored.
pub fn aggregate(
    class_id: &str,
    subjects: &[Subject],
    histories: Vec<(StudentSummary, Vec<QuizAttempt>)>,
) -> ClassInsights {
    let class_subjects: HashSet<&str> = subjects.iter().map(|s| s.id.as_str()).collect();
    let mut students = Vec::with_capacity(histories.len());
    let mut wrong: BTreeMap<(String, String), WrongTally> = BTreeMap::new();
    let mut active_students = 0;

    for (student, history) in histories {
        let in_class: Vec<&QuizAttempt> = history
            .iter()
            .filter(|a| class_subjects.contains(a.subject_id.as_str()))
            .collect();
        if !in_class.is_empty() {
            active_students += 1;
        }

        for attempt in &in_class {
            for wq in &attempt.meta.wrong_questions {
                let text = wq.question.trim();
                if text.is_empty() {
                    continue;
                }
                let subject_id = wq.subject_id.clone().unwrap_or_else(|| attempt.subject_id.clone());
                wrong
                    .entry((subject_id, text.to_lowercase()))
                    .or_insert_with(|| WrongTally {
                        question: text.to_string(),
                        students: HashSet::new(),
                    })
                    .students
                    .insert(student.id.clone());
            }
        }

        students.push(StudentInsight {
            average: average_grade(&tally_by_subject(in_class.iter().copied())),
            attempts: in_class.len(),
            student,
        });
    }

    let averages: Vec<f64> = students.iter().filter_map(|s| s.average).collect();

    let mut struggling: Vec<StudentInsight> = students
        .iter()
        .filter(|s| s.average.is_some_and(|a| a < STRUGGLING_BELOW))
        .cloned()
        .collect();
    struggling.sort_by(|a, b| grade_of(a).total_cmp(&grade_of(b)));
    struggling.truncate(COHORT_LIMIT);

    let mut brilliant: Vec<StudentInsight> = students
        .iter()
        .filter(|s| s.average.is_some_and(|a| a > BRILLIANT_ABOVE))
        .cloned()
        .collect();
    brilliant.sort_by(|a, b| grade_of(b).total_cmp(&grade_of(a)));
    brilliant.truncate(COHORT_LIMIT);

    let mut hardest_questions: Vec<HardQuestion> = if active_students == 0 {
        Vec::new()
    } else {
        wrong
            .into_iter()
            .map(|((subject_id, _), tally)| HardQuestion {
                subject_title: subjects
                    .iter()
                    .find(|s| s.id == subject_id)
                    .map(|s| s.title.clone()),
                subject_id,
                question: tally.question,
                wrong_students: tally.students.len(),
                wrong_rate: tally.students.len() as f64 / active_students as f64,
            })
            .filter(|q| q.wrong_rate > HARD_QUESTION_RATE)
            .collect()
    };
    hardest_questions.sort_by(|a, b| b.wrong_rate.total_cmp(&a.wrong_rate));

    ClassInsights {
        class_id: class_id.to_string(),
        class_average: average(&averages),
        active_students,
        struggling,
        brilliant,
        hardest_questions,
        students,
    }
}

fn grade_of(insight: &StudentInsight) -> f64 {
    insight.average.unwrap_or_default()
}

pub struct InsightsService {
    classes: Arc<dyn ClassRepository>,
    subjects: Arc<dyn SubjectRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    concurrency: usize,
}

impl InsightsService {
    pub fn new(
        classes: Arc<dyn ClassRepository>,
        subjects: Arc<dyn SubjectRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        concurrency: usize,
    ) -> Self {
        Self {
            classes,
            subjects,
            attempts,
            concurrency,
        }
    }

    /// Computes insights from every student's score history. A history that
    /// fails to load counts as no attempts.
    pub async fn class_insights(&self, class_id: &str) -> AppResult<ClassInsights> {
        let (roster, subjects) = tokio::try_join!(
            self.classes.students(class_id),
            self.subjects.list_by_class(class_id)
        )?;

        log::info!(
            "Computing insights for class {} ({} students, {} chapters)",
            class_id,
            roster.len(),
            subjects.len()
        );

        let attempts = self.attempts.clone();
        let histories = map_bounded(roster, self.concurrency, move |student| {
            let attempts = attempts.clone();
            async move {
                let history = match attempts.scores_of(&student.id).await {
                    Ok(history) => history,
                    Err(e) => {
                        log::warn!("Scores of student {} unavailable: {}", student.id, e);
                        Vec::new()
                    }
                };
                (student, history)
            }
        })
        .await;

        Ok(aggregate(class_id, &subjects, histories))
    }

    /// Aggregation done by the backend, when it offers it.
    pub async fn server_insights(&self, class_id: &str, window: InsightsWindow) -> AppResult<ServerClassInsights> {
        self.attempts.class_insights(class_id, window).await
    }
}
