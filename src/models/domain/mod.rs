pub mod class;
pub mod mistake;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod subject;
pub mod user;
pub use class::{Class, InviteOutcome};
pub use mistake::{Mistake, MistakeReport};
pub use quiz_attempt::QuizAttempt;
pub use quiz_question::QuizQuestion;
pub use subject::Subject;
pub use user::{Role, StudentSummary, User};
