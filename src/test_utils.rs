pub use fixtures::*;

pub mod fixtures {
    use crate::models::domain::{QuizAttempt, QuizQuestion, StudentSummary, Subject};

    /// A chapter of class `c1` with `questions` questions; the correct
    /// option is always the first one.
    pub fn sample_subject(id: &str, questions: usize) -> Subject {
        let quiz = (0..questions)
            .map(|i| {
                let options = ["A", "B", "C", "D"].map(|o| format!("{}{}", o, i + 1));
                let labels: Vec<&str> = options.iter().map(String::as_str).collect();
                QuizQuestion::new(&format!("Question {}", i + 1), &labels, labels[0])
            })
            .collect();
        Subject::new(id, "c1", &format!("Chapitre {}", id)).with_questions(quiz)
    }

    pub fn student(id: &str) -> StudentSummary {
        StudentSummary {
            id: id.to_string(),
            name: Some(format!("Élève {}", id)),
            email: Some(format!("{}@school.ch", id)),
            in_class: true,
        }
    }

    /// An attempt of `correct` right answers out of `total`.
    pub fn attempt(subject_id: &str, correct: u32, total: u32) -> QuizAttempt {
        let mut attempt = QuizAttempt::new(subject_id, f64::from(correct) * 20.0, f64::from(total));
        attempt.correct_answers = f64::from(correct);
        attempt
    }
}

pub mod test_helpers {
    use crate::errors::AppError;

    /// Asserts that the error was raised before any request was sent.
    pub fn assert_validation_error(err: &AppError) {
        assert!(
            matches!(err, AppError::Validation(_)),
            "Expected a validation error, got: {:?}",
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::*;
    use crate::errors::AppError;
    use crate::services::answer_resolver::{resolve, Resolution};

    #[test]
    fn test_sample_subject_answers_first_option() {
        let subject = sample_subject("s1", 3);
        assert_eq!(subject.quiz_questions.len(), 3);
        assert_eq!(subject.class_id.as_deref(), Some("c1"));
        for question in &subject.quiz_questions {
            assert_eq!(question.options.len(), 4);
            assert_eq!(resolve(question), Resolution::Resolved(0));
        }
    }

    #[test]
    fn test_attempt_fixture() {
        let attempt = attempt("s1", 7, 10);
        assert_eq!(attempt.points, 140.0);
        assert_eq!(attempt.max_points(), 200.0);
    }

    #[test]
    fn test_assert_validation_error() {
        assert_validation_error(&AppError::validation("Nom vide"));
    }
}
