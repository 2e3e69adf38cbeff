use serde::Serialize;
use serde_json::Value;

use crate::models::domain::User;
use crate::models::dto::wire::{self, FromWire};

/// `POST /users/set-password` answers with a token and, usually, the user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl LoginResponse {
    pub fn from_value(value: &Value) -> Self {
        LoginResponse {
            token: wire::text_field(value, &["token", "accessToken"]),
            user: value.get("user").and_then(User::from_wire),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardQuestionStat {
    pub question: String,
    pub attempts_estimated: f64,
    pub wrong_count: f64,
    pub wrong_rate: f64,
}

impl FromWire for HardQuestionStat {
    fn from_wire(value: &Value) -> Option<Self> {
        Some(HardQuestionStat {
            question: wire::text_field(value, &["question", "text"])?,
            attempts_estimated: wire::number_field(value, &["attemptsEstimated", "attempts"]),
            wrong_count: wire::number_field(value, &["wrongCount"]),
            wrong_rate: wire::number_field(value, &["wrongRate"]),
        })
    }
}

/// `GET /quizzes/class/:classId/insights`, aggregated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerClassInsights {
    pub class_id: Option<String>,
    pub class_name: Option<String>,
    pub mean: Option<f64>,
    pub attempts: f64,
    pub students_count: f64,
    pub hardest_questions: Vec<HardQuestionStat>,
}

impl FromWire for ServerClassInsights {
    fn from_wire(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let class = value.get("class").unwrap_or(&Value::Null);
        let stats = value.get("stats").unwrap_or(&Value::Null);

        Some(ServerClassInsights {
            class_id: wire::id_of(class),
            class_name: wire::text_field(class, &["name", "title"]),
            mean: wire::optional_number(stats, &["mean", "average"]),
            attempts: wire::number_field(stats, &["attempts"]),
            students_count: wire::number_field(stats, &["studentsCount"]),
            hardest_questions: wire::adapt_list(
                value.get("hardestQuestions").unwrap_or(&Value::Null),
                &[],
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_reads_token_and_user() {
        let response = LoginResponse::from_value(&json!({
            "token": "abc.def.ghi",
            "user": {"_id": "u1", "type": "student"}
        }));
        assert_eq!(response.token.as_deref(), Some("abc.def.ghi"));
        assert_eq!(response.user.unwrap().id, "u1");

        let empty = LoginResponse::from_value(&json!({"message": "ok"}));
        assert!(empty.token.is_none());
        assert!(empty.user.is_none());
    }

    #[test]
    fn test_server_insights_mapping() {
        let insights = ServerClassInsights::from_wire(&json!({
            "class": {"_id": "c1", "name": "3M2"},
            "stats": {"mean": 4.6, "attempts": 31, "studentsCount": 12},
            "hardestQuestions": [
                {"question": "Q1", "attemptsEstimated": 10, "wrongCount": 8, "wrongRate": 0.8},
                {"wrongRate": 0.9}
            ]
        }))
        .unwrap();

        assert_eq!(insights.class_name.as_deref(), Some("3M2"));
        assert_eq!(insights.mean, Some(4.6));
        assert_eq!(insights.students_count, 12.0);
        assert_eq!(insights.hardest_questions.len(), 1);
        assert_eq!(insights.hardest_questions[0].wrong_count, 8.0);
    }

    #[test]
    fn test_server_insights_without_stats() {
        let insights = ServerClassInsights::from_wire(&json!({})).unwrap();
        assert_eq!(insights.mean, None);
        assert!(insights.hardest_questions.is_empty());
    }
}
