pub mod class_repository;
pub mod quiz_attempt_repository;
pub mod subject_repository;
pub mod user_repository;

pub use class_repository::{ClassRepository, HttpClassRepository};
pub use quiz_attempt_repository::{HttpQuizAttemptRepository, InsightsWindow, QuizAttemptRepository};
pub use subject_repository::{HttpSubjectRepository, SubjectRepository};
pub use user_repository::{HttpUserRepository, UserRepository};
