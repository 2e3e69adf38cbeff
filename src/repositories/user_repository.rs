use async_trait::async_trait;
use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{
            request::{SetPasswordRequest, UpdateNameRequest, UploadFile},
            wire::{self, FromWire},
        },
    },
    services::{api_client::ApiClient, transport::FormPart},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: &str) -> AppResult<User>;
    /// The updated user when the backend echoes it.
    async fn update_name(&self, id: &str, request: &UpdateNameRequest) -> AppResult<Option<User>>;
    async fn upload_profile_image(&self, id: &str, file: &UploadFile) -> AppResult<Option<User>>;
    /// `None` when the user has no image.
    async fn profile_image(&self, id: &str) -> AppResult<Option<Vec<u8>>>;
    async fn set_password(&self, request: &SetPasswordRequest) -> AppResult<()>;
}

pub struct HttpUserRepository {
    api: ApiClient,
}

impl HttpUserRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn echoed_user(body: &Value) -> Option<User> {
    User::from_wire(wire::unwrap_object(body, "user"))
}

#[async_trait]
impl UserRepository for HttpUserRepository {
    async fn get(&self, id: &str) -> AppResult<User> {
        let body = self.api.get(&format!("/users/{}", id)).await?;
        echoed_user(&body).ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    async fn update_name(&self, id: &str, request: &UpdateNameRequest) -> AppResult<Option<User>> {
        let body = self.api.put(&format!("/users/{}", id), request).await?;
        Ok(echoed_user(&body))
    }

    async fn upload_profile_image(&self, id: &str, file: &UploadFile) -> AppResult<Option<User>> {
        let parts = vec![FormPart::File {
            name: "image".to_string(),
            file_name: file.file_name.clone(),
            mime: file.mime.clone(),
            bytes: file.bytes.clone(),
        }];
        let body = self
            .api
            .post_multipart(&format!("/users/{}/profile-image", id), parts)
            .await?;
        Ok(echoed_user(&body))
    }

    async fn profile_image(&self, id: &str) -> AppResult<Option<Vec<u8>>> {
        match self.api.get_bytes(&format!("/users/{}/profile-image", id)).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_missing_resource() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_password(&self, request: &SetPasswordRequest) -> AppResult<()> {
        self.api.post("/users/set-password", request).await?;
        Ok(())
    }
}
