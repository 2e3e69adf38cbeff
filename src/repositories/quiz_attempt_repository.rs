use async_trait::async_trait;
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{MistakeReport, QuizAttempt},
        dto::{
            quiz_dto::SubmitQuizRequest,
            response::ServerClassInsights,
            wire::{self, FromWire},
        },
    },
    services::api_client::ApiClient,
};

const SCORE_LIST_KEYS: &[&str] = &["results", "scores", "attempts", "data"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsightsWindow {
    #[default]
    All,
    Weekly,
}

impl InsightsWindow {
    pub fn as_query(&self) -> &'static str {
        match self {
            InsightsWindow::All => "all",
            InsightsWindow::Weekly => "weekly",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn submit(&self, subject_id: &str, request: &SubmitQuizRequest) -> AppResult<Value>;
    async fn my_mistakes(&self) -> AppResult<MistakeReport>;
    async fn my_scores(&self) -> AppResult<Vec<QuizAttempt>>;
    async fn scores_of(&self, user_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn class_insights(&self, class_id: &str, window: InsightsWindow) -> AppResult<ServerClassInsights>;
}

pub struct HttpQuizAttemptRepository {
    api: ApiClient,
}

impl HttpQuizAttemptRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl QuizAttemptRepository for HttpQuizAttemptRepository {
    async fn submit(&self, subject_id: &str, request: &SubmitQuizRequest) -> AppResult<Value> {
        let body = self
            .api
            .post(&format!("/quizzes/{}/submit", subject_id), request)
            .await?;
        log::info!(
            "Submitted quiz {}: {}/{}",
            subject_id,
            request.correct_answers,
            request.total_questions
        );
        Ok(body)
    }

    async fn my_mistakes(&self) -> AppResult<MistakeReport> {
        let body = self.api.get("/quizzes/me/mistakes").await?;
        MistakeReport::from_wire(&body)
            .ok_or_else(|| AppError::MalformedResponse("Unreadable mistakes report".to_string()))
    }

    async fn my_scores(&self) -> AppResult<Vec<QuizAttempt>> {
        let body = self.api.get("/quizzes/me/scores").await?;
        Ok(wire::adapt_list(&body, SCORE_LIST_KEYS))
    }

    async fn scores_of(&self, user_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let body = self.api.get(&format!("/quizzes/user/{}/scores", user_id)).await?;
        Ok(wire::adapt_list(&body, SCORE_LIST_KEYS))
    }

    async fn class_insights(&self, class_id: &str, window: InsightsWindow) -> AppResult<ServerClassInsights> {
        let body = self
            .api
            .get(&format!(
                "/quizzes/class/{}/insights?window={}",
                class_id,
                window.as_query()
            ))
            .await?;
        ServerClassInsights::from_wire(&body)
            .ok_or_else(|| AppError::MalformedResponse("Unreadable class insights".to_string()))
    }
}
