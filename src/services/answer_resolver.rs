//! Finds the correct option of a question.
//!
//! Quizzes come from several backend generations, each marking the right
//! answer differently. Matchers are tried in order and the first one that
//! lands on an existing option wins.

use crate::models::domain::quiz_question::{AnswerReference, QuizOption, QuizQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(usize),
    Unresolved,
}

impl Resolution {
    pub fn index(&self) -> Option<usize> {
        match self {
            Resolution::Resolved(index) => Some(*index),
            Resolution::Unresolved => None,
        }
    }
}

type Matcher = fn(&QuizQuestion) -> Option<usize>;

const MATCHERS: &[Matcher] = &[by_answer_text, by_option_flag, by_index_hint, by_reference];

pub fn resolve(question: &QuizQuestion) -> Resolution {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(question))
        .map(Resolution::Resolved)
        .unwrap_or(Resolution::Unresolved)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn position_by_label(options: &[QuizOption], text: &str) -> Option<usize> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }
    options.iter().position(|o| normalize(&o.label) == wanted)
}

fn position_by_id(options: &[QuizOption], id: &str) -> Option<usize> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    options.iter().position(|o| o.id.as_deref() == Some(id))
}

fn in_bounds(value: f64, len: usize) -> Option<usize> {
    (value >= 0.0 && value.fract() == 0.0 && value < len as f64).then_some(value as usize)
}

/// `answers[0]` holds the correct option's text.
fn by_answer_text(question: &QuizQuestion) -> Option<usize> {
    position_by_label(&question.options, question.answers.first()?)
}

fn by_option_flag(question: &QuizQuestion) -> Option<usize> {
    question.options.iter().position(|o| o.flagged_correct)
}

fn by_index_hint(question: &QuizQuestion) -> Option<usize> {
    in_bounds(question.index_hint?, question.options.len())
}

fn by_reference(question: &QuizQuestion) -> Option<usize> {
    let options = &question.options;
    match question.reference.as_ref()? {
        AnswerReference::Number { value } => in_bounds(*value, options.len()),
        AnswerReference::Text { value } => value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|n| in_bounds(n, options.len()))
            .or_else(|| position_by_id(options, value))
            .or_else(|| position_by_label(options, value)),
        AnswerReference::Option { id, text } => id
            .as_deref()
            .and_then(|id| position_by_id(options, id))
            .or_else(|| text.as_deref().and_then(|t| position_by_label(options, t))),
    }
}
