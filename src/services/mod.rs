pub mod answer_resolver;
pub mod api_client;
pub mod class_service;
pub mod grading;
pub mod http_helpers;
pub mod insights_service;
pub mod mistake_tree;
pub mod progress_service;
pub mod quiz_attempt_service;
pub mod quiz_authoring;
pub mod transport;
pub mod user_service;
pub mod validation;
