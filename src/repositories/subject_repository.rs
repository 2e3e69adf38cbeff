use async_trait::async_trait;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuizQuestion, Subject},
        dto::{
            quiz_dto::{CreateSubjectRequest, UpdateSubjectRequest},
            wire::{self, FromWire},
        },
    },
    services::{api_client::ApiClient, transport::FormPart},
};

const SUBJECT_LIST_KEYS: &[&str] = &["subjects", "data"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<Subject>>;
    async fn list_by_class(&self, class_id: &str) -> AppResult<Vec<Subject>>;
    async fn get(&self, id: &str) -> AppResult<Subject>;
    /// `None` when the backend only acknowledges the write.
    async fn create_in_class(&self, class_id: &str, request: &CreateSubjectRequest) -> AppResult<Option<Subject>>;
    async fn update(&self, id: &str, request: &UpdateSubjectRequest) -> AppResult<Subject>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct HttpSubjectRepository {
    api: ApiClient,
}

impl HttpSubjectRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn text_part(name: &str, value: impl ToString) -> FormPart {
    FormPart::Text {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Multipart fields of a chapter creation.
pub fn create_form(request: &CreateSubjectRequest) -> Vec<FormPart> {
    let mut parts = vec![
        text_part("title", &request.title),
        text_part("description", &request.description),
        text_part("autoGenerateQuiz", request.auto_generate_quiz),
        text_part("quizQuestionCount", request.quiz_question_count),
        text_part("difficulty", request.difficulty.as_api()),
    ];
    if let Some(file) = &request.file {
        parts.push(FormPart::File {
            name: "file".to_string(),
            file_name: file.file_name.clone(),
            mime: file.mime.clone(),
            bytes: file.bytes.clone(),
        });
    }
    parts
}

fn single(value: &serde_json::Value) -> AppResult<Subject> {
    Subject::from_wire(wire::unwrap_object(value, "subject"))
        .ok_or_else(|| AppError::MalformedResponse("Subject response without id".to_string()))
}

/// The chapter as saved, for replies that carry no subject.
fn saved_locally(id: &str, request: &UpdateSubjectRequest) -> Subject {
    Subject {
        id: id.to_string(),
        class_id: None,
        title: request.title.clone(),
        description: Some(request.description.clone()).filter(|d| !d.is_empty()),
        quiz_questions: request.quiz_questions.iter().map(QuizQuestion::from).collect(),
    }
}

#[async_trait]
impl SubjectRepository for HttpSubjectRepository {
    async fn list_all(&self) -> AppResult<Vec<Subject>> {
        let body = self.api.get("/subjects").await?;
        Ok(wire::adapt_list(&body, SUBJECT_LIST_KEYS))
    }

    async fn list_by_class(&self, class_id: &str) -> AppResult<Vec<Subject>> {
        let body = self.api.get(&format!("/subjects/class/{}", class_id)).await?;
        let mut subjects: Vec<Subject> = wire::adapt_list(&body, SUBJECT_LIST_KEYS);
        for subject in subjects.iter_mut().filter(|s| s.class_id.is_none()) {
            subject.class_id = Some(class_id.to_string());
        }
        Ok(subjects)
    }

    async fn get(&self, id: &str) -> AppResult<Subject> {
        let body = self.api.get(&format!("/subjects/{}", id)).await?;
        single(&body)
    }

    async fn create_in_class(&self, class_id: &str, request: &CreateSubjectRequest) -> AppResult<Option<Subject>> {
        let body = self
            .api
            .post_multipart(&format!("/subjects/class/{}", class_id), create_form(request))
            .await?;
        match single(&body) {
            Ok(subject) => {
                log::info!(
                    "Created chapter {} in class {} ({} generated questions)",
                    subject.id,
                    class_id,
                    subject.quiz_questions.len()
                );
                Ok(Some(subject))
            }
            Err(_) => {
                log::info!("Created chapter \"{}\" in class {}", request.title, class_id);
                Ok(None)
            }
        }
    }

    async fn update(&self, id: &str, request: &UpdateSubjectRequest) -> AppResult<Subject> {
        let body = self.api.put(&format!("/subjects/{}", id), request).await?;
        Ok(single(&body).unwrap_or_else(|_| saved_locally(id, request)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.api.delete(&format!("/subjects/{}", id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::models::domain::quiz_question::QuizQuestionPayload;
    use crate::models::dto::{quiz_dto::Difficulty, request::UploadFile};
    use crate::services::transport::{HttpResponse, MockHttpTransport, RequestBody};
    use serde_json::json;
    use std::sync::Arc;

    fn respond(body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status: 200,
            content_type: Some("application/json".into()),
            body: body.to_string().into_bytes(),
        }
    }

    fn repository(transport: MockHttpTransport) -> HttpSubjectRepository {
        HttpSubjectRepository::new(ApiClient::new(
            "http://backend.test",
            Arc::new(transport),
            Arc::new(MemoryTokenStore::new()),
        ))
    }

    #[test]
    fn test_create_form_fields() {
        let request = CreateSubjectRequest::new("Optique", "Lentilles")
            .with_question_count(99)
            .with_difficulty(Difficulty::Hard)
            .with_file(UploadFile::new("cours.pdf", "application/pdf", vec![1]));

        let parts = create_form(&request);
        assert!(parts.contains(&text_part("quizQuestionCount", 50)));
        assert!(parts.contains(&text_part("difficulty", "difficile")));
        assert!(parts.contains(&text_part("autoGenerateQuiz", true)));
        assert!(matches!(parts.last(), Some(FormPart::File { name, .. }) if name == "file"));
    }

    #[tokio::test]
    async fn test_get_unwraps_subject() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(json!({"subject": {"_id": "s1", "title": "Optique"}}))));

        let subject = repository(transport).get("s1").await.unwrap();
        assert_eq!(subject.title, "Optique");
    }

    #[tokio::test]
    async fn test_list_by_class_fills_missing_class() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/api/subjects/class/c1"))
            .returning(|_| Ok(respond(json!([{"_id": "s1"}, {"_id": "s2", "classId": "c9"}]))));

        let subjects = repository(transport).list_by_class("c1").await.unwrap();
        assert_eq!(subjects[0].class_id.as_deref(), Some("c1"));
        assert_eq!(subjects[1].class_id.as_deref(), Some("c9"));
    }

    #[tokio::test]
    async fn test_create_is_multipart() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| matches!(req.body, RequestBody::Multipart(_)))
            .returning(|_| Ok(respond(json!({"subject": {"_id": "s3", "quizQuestions": []}}))));

        let subject = repository(transport)
            .create_in_class("c1", &CreateSubjectRequest::new("Optique", ""))
            .await
            .unwrap();
        assert_eq!(subject.map(|s| s.id).as_deref(), Some("s3"));
    }

    #[tokio::test]
    async fn test_create_acknowledged_without_subject() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse {
                status: 201,
                content_type: Some("application/json".into()),
                body: json!({"message": "Chapitre créé"}).to_string().into_bytes(),
            })
        });

        let created = repository(transport)
            .create_in_class("c1", &CreateSubjectRequest::new("Optique", ""))
            .await
            .unwrap();
        assert_eq!(created, None);
    }

    #[tokio::test]
    async fn test_update_acknowledged_keeps_saved_quiz() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(json!({"message": "Quiz mis à jour"}))));

        let request = UpdateSubjectRequest::new(
            "Optique",
            "",
            vec![QuizQuestionPayload {
                question: "Capitale ?".into(),
                options: vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Metz".into()],
                answers: vec!["Lyon".into()],
            }],
        );
        let subject = repository(transport).update("s1", &request).await.unwrap();
        assert_eq!(subject.id, "s1");
        assert_eq!(subject.description, None);
        assert_eq!(subject.quiz_questions[0].option_labels()[1], "Lyon");
        assert_eq!(subject.quiz_questions[0].answers, vec!["Lyon"]);
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_not_a_subject() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse {
                status: 200,
                content_type: Some("text/plain".into()),
                body: b"Created".to_vec(),
            })
        });

        let err = repository(transport).get("s1").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_get_without_object_is_malformed() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| Ok(respond(json!("ok"))));

        let err = repository(transport).get("s1").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
