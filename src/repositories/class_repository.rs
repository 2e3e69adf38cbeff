use async_trait::async_trait;
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Class, InviteOutcome, StudentSummary},
        dto::{
            request::{ClassNameRequest, StudentIdsRequest},
            wire::{self, FromWire},
        },
    },
    services::api_client::ApiClient,
};

const CLASS_LIST_KEYS: &[&str] = &["classes", "data"];
const STUDENT_LIST_KEYS: &[&str] = &["students", "users", "data"];

/// Tried in order until one answers.
const ALL_STUDENTS_ENDPOINTS: &[&str] = &["/users?type=student", "/users/students", "/students"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Class>>;
    /// `None` when the backend only acknowledges the write.
    async fn create(&self, request: &ClassNameRequest) -> AppResult<Option<Class>>;
    async fn update(&self, id: &str, request: &ClassNameRequest) -> AppResult<Class>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn students(&self, class_id: &str) -> AppResult<Vec<StudentSummary>>;
    async fn school_students(&self, class_id: &str) -> AppResult<Vec<StudentSummary>>;
    async fn invite(&self, class_id: &str, request: &StudentIdsRequest) -> AppResult<InviteOutcome>;
    async fn remove_students(&self, class_id: &str, request: &StudentIdsRequest) -> AppResult<()>;
    async fn all_students(&self) -> AppResult<Vec<StudentSummary>>;
}

pub struct HttpClassRepository {
    api: ApiClient,
}

impl HttpClassRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn single(value: &Value, fallback_name: &str) -> AppResult<Class> {
        let mut class = Class::from_wire(wire::unwrap_object(value, "class"))
            .ok_or_else(|| AppError::MalformedResponse("Class response without id".to_string()))?;
        if class.name == crate::models::domain::class::DEFAULT_CLASS_NAME && !fallback_name.is_empty() {
            class.name = fallback_name.to_string();
        }
        Ok(class)
    }
}

#[async_trait]
impl ClassRepository for HttpClassRepository {
    async fn list(&self) -> AppResult<Vec<Class>> {
        let body = self.api.get("/classes").await?;
        Ok(wire::adapt_list(&body, CLASS_LIST_KEYS))
    }

    async fn create(&self, request: &ClassNameRequest) -> AppResult<Option<Class>> {
        let body = self.api.post("/classes", request).await?;
        let class = Self::single(&body, &request.name).ok();
        match &class {
            Some(class) => log::info!("Created class {} ({})", class.name, class.id),
            None => log::info!("Created class {}", request.name),
        }
        Ok(class)
    }

    async fn update(&self, id: &str, request: &ClassNameRequest) -> AppResult<Class> {
        let body = self.api.put(&format!("/classes/{}", id), request).await?;
        Ok(Self::single(&body, &request.name).unwrap_or_else(|_| Class::new(id, &request.name)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.api.delete(&format!("/classes/{}", id)).await?;
        log::info!("Deleted class {}", id);
        Ok(())
    }

    async fn students(&self, class_id: &str) -> AppResult<Vec<StudentSummary>> {
        let body = self.api.get(&format!("/classes/{}/students", class_id)).await?;
        Ok(wire::adapt_list(&body, STUDENT_LIST_KEYS))
    }

    async fn school_students(&self, class_id: &str) -> AppResult<Vec<StudentSummary>> {
        let body = self
            .api
            .get(&format!("/classes/{}/school-students", class_id))
            .await?;
        Ok(wire::adapt_list(&body, STUDENT_LIST_KEYS))
    }

    async fn invite(&self, class_id: &str, request: &StudentIdsRequest) -> AppResult<InviteOutcome> {
        let body = self
            .api
            .post(&format!("/classes/{}/invite-students", class_id), request)
            .await?;
        Ok(InviteOutcome::from_response(&body))
    }

    async fn remove_students(&self, class_id: &str, request: &StudentIdsRequest) -> AppResult<()> {
        self.api
            .delete_with_body(&format!("/classes/{}/students", class_id), request)
            .await?;
        Ok(())
    }

    async fn all_students(&self) -> AppResult<Vec<StudentSummary>> {
        let mut last_error = None;
        for endpoint in ALL_STUDENTS_ENDPOINTS {
            match self.api.get(endpoint).await {
                Ok(body) => return Ok(wire::adapt_list(&body, STUDENT_LIST_KEYS)),
                Err(e) => {
                    log::debug!("Student listing via {} failed: {}", endpoint, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| AppError::NotFound("No student listing endpoint".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::services::transport::{HttpResponse, MockHttpTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn respond(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            content_type: Some("application/json".into()),
            body: body.to_string().into_bytes(),
        }
    }

    fn repository(transport: MockHttpTransport) -> HttpClassRepository {
        HttpClassRepository::new(ApiClient::new(
            "http://backend.test",
            Arc::new(transport),
            Arc::new(MemoryTokenStore::new()),
        ))
    }

    #[tokio::test]
    async fn test_list_accepts_wrapped_response() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(200, json!({"classes": [{"_id": "c1", "name": "3M2"}, {"name": "no id"}]}))));

        let classes = repository(transport).list().await.unwrap();
        assert_eq!(classes, vec![Class::new("c1", "3M2")]);
    }

    #[tokio::test]
    async fn test_all_students_falls_back_through_endpoints() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(3).returning(|req| {
            if req.url.ends_with("/api/students") {
                Ok(respond(200, json!({"students": [{"_id": "s1"}, {"_id": "s2"}]})))
            } else {
                Ok(respond(404, json!({"error": "Not found"})))
            }
        });

        let students = repository(transport).all_students().await.unwrap();
        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn test_all_students_reports_last_failure() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Ok(respond(500, json!({"message": "down"}))));

        let err = repository(transport).all_students().await.unwrap_err();
        assert_eq!(err.to_string(), "down");
    }

    #[tokio::test]
    async fn test_create_returns_class() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(201, json!({"class": {"_id": "c2"}}))));

        let created = repository(transport).create(&ClassNameRequest::new("2M1")).await.unwrap();
        assert_eq!(created, Some(Class::new("c2", "2M1")));
    }

    #[tokio::test]
    async fn test_create_acknowledged_without_class() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(201, json!({"message": "Classe créée"}))));

        let created = repository(transport).create(&ClassNameRequest::new("2M1")).await.unwrap();
        assert_eq!(created, None);
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_not_a_class() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse {
                status: 201,
                content_type: Some("text/plain".into()),
                body: b"Created".to_vec(),
            })
        });

        let created = repository(transport).create(&ClassNameRequest::new("3M2")).await.unwrap();
        assert_eq!(created, None);
        assert_eq!(Class::from_wire(&json!("Created")), None);
    }

    #[tokio::test]
    async fn test_invite_parses_outcome() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/api/classes/c1/invite-students"))
            .returning(|_| Ok(respond(200, json!({"results": {"added": ["s1"], "alreadyInClass": ["s2"], "invalid": []}}))));

        let request = StudentIdsRequest {
            student_ids: vec!["s1".into(), "s2".into()],
        };
        let outcome = repository(transport).invite("c1", &request).await.unwrap();
        assert_eq!(outcome.summary(), "1 ajouté(s) · 1 déjà dans la classe");
    }
}
