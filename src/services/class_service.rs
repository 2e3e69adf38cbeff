use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::AppResult,
    models::{
        domain::{class::most_recent, Class, InviteOutcome, StudentSummary},
        dto::request::{ClassNameRequest, StudentIdsRequest},
    },
    repositories::ClassRepository,
    services::validation::require_text,
};

pub const CLASS_NAME_REQUIRED: &str = "Nom de classe requis";

pub struct ClassService {
    classes: Arc<dyn ClassRepository>,
}

impl ClassService {
    pub fn new(classes: Arc<dyn ClassRepository>) -> Self {
        Self { classes }
    }

    pub async fn list(&self) -> AppResult<Vec<Class>> {
        self.classes.list().await
    }

    /// The created class, when the backend echoes it back.
    pub async fn create(&self, name: &str) -> AppResult<Option<Class>> {
        let request = ClassNameRequest::new(&require_text(name, CLASS_NAME_REQUIRED)?);
        request.validate()?;
        self.classes.create(&request).await
    }

    pub async fn rename(&self, class_id: &str, name: &str) -> AppResult<Class> {
        let request = ClassNameRequest::new(&require_text(name, CLASS_NAME_REQUIRED)?);
        request.validate()?;
        self.classes.update(class_id, &request).await
    }

    /// Newest classes first, for the student home.
    pub async fn recent(&self, limit: usize) -> AppResult<Vec<Class>> {
        Ok(most_recent(&self.classes.list().await?, limit))
    }

    pub async fn delete(&self, class_id: &str) -> AppResult<()> {
        self.classes.delete(class_id).await
    }

    pub async fn roster(&self, class_id: &str) -> AppResult<Vec<StudentSummary>> {
        self.classes.students(class_id).await
    }

    /// School students with their in-class flag, for the invite screen.
    pub async fn invitable(&self, class_id: &str) -> AppResult<Vec<StudentSummary>> {
        self.classes.school_students(class_id).await
    }

    pub async fn all_students(&self) -> AppResult<Vec<StudentSummary>> {
        self.classes.all_students().await
    }

    pub async fn invite(&self, class_id: &str, student_ids: Vec<String>) -> AppResult<InviteOutcome> {
        let request = StudentIdsRequest { student_ids };
        request.validate()?;
        let outcome = self.classes.invite(class_id, &request).await?;
        log::info!("Invite into class {}: {}", class_id, outcome.summary());
        Ok(outcome)
    }

    pub async fn remove_students(&self, class_id: &str, student_ids: Vec<String>) -> AppResult<()> {
        let request = StudentIdsRequest { student_ids };
        request.validate()?;
        self.classes.remove_students(class_id, &request).await
    }
}
