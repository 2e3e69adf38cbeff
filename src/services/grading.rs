//! Swiss-style grading on a 0–6 scale.

use std::collections::HashMap;

use crate::models::domain::QuizAttempt;

pub const POINTS_PER_QUESTION: f64 = 20.0;
pub const MAX_GRADE: f64 = 6.0;
pub const COMPLETE_EPS: f64 = 0.0001;

/// Points kept for a subject once every attempt has been tallied.
///
/// Summing retries can exceed the subject maximum; the best single
/// attempt is used in that case.
pub fn final_points(sum: f64, best: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    let points = if sum > max { best } else { sum };
    points.clamp(0.0, max)
}

pub fn grade_on_six(points: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (points / max * MAX_GRADE).clamp(0.0, MAX_GRADE)
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn is_complete(grade: f64) -> bool {
    grade >= MAX_GRADE - COMPLETE_EPS
}

/// Mean of the values, `None` when there are none.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubjectTally {
    pub sum: f64,
    pub best: f64,
    pub max: f64,
    pub attempts: u32,
}

impl SubjectTally {
    pub fn record(&mut self, attempt: &QuizAttempt) {
        let max = attempt.max_points();
        // raw points; only the final result is clamped
        self.sum += attempt.points;
        self.best = self.best.max(attempt.points);
        self.max = self.max.max(max);
        self.attempts += 1;
    }

    pub fn points(&self) -> f64 {
        final_points(self.sum, self.best, self.max)
    }

    /// `None` when nothing gradeable was recorded.
    pub fn grade(&self) -> Option<f64> {
        if self.attempts == 0 || self.max <= 0.0 {
            None
        } else {
            Some(grade_on_six(self.points(), self.max))
        }
    }
}

/// Groups eligible attempts by subject id.
pub fn tally_by_subject<'a, I>(attempts: I) -> HashMap<String, SubjectTally>
where
    I: IntoIterator<Item = &'a QuizAttempt>,
{
    let mut tallies: HashMap<String, SubjectTally> = HashMap::new();
    for attempt in attempts {
        if !attempt.is_eligible() {
            continue;
        }
        tallies
            .entry(attempt.subject_id.clone())
            .or_default()
            .record(attempt);
    }
    tallies
}

/// Average grade over the subjects that have a grade.
pub fn average_grade(tallies: &HashMap<String, SubjectTally>) -> Option<f64> {
    let grades: Vec<f64> = tallies.values().filter_map(SubjectTally::grade).collect();
    average(&grades)
}
