use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_user, Session},
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::request::{SetPasswordRequest, UpdateNameRequest, UploadFile},
    },
    repositories::UserRepository,
    services::validation::{require_text, validate_new_password, validate_profile_image},
};

/// Fields the backend left out keep their current value.
fn merge_user(current: User, echoed: Option<User>) -> User {
    let Some(mut user) = echoed else {
        return current;
    };
    if !user.role.is_known() {
        user.role = current.role;
    }
    user.email = user.email.or(current.email);
    user.name = user.name.or(current.name);
    user.school_id = user.school_id.or(current.school_id);
    user.profile_image = user.profile_image.or(current.profile_image);
    user
}

/// Profile page actions of the signed-in user.
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.users.get(id).await
    }

    /// Does nothing when the name is unchanged.
    pub async fn update_name(&self, session: &mut Session, name: &str) -> AppResult<User> {
        let current = require_user(session.state())?.clone();
        let name = require_text(name, "Nom vide")?;
        if current.name.as_deref() == Some(name.as_str()) {
            return Ok(current);
        }

        let request = UpdateNameRequest::new(&name);
        request.validate()?;
        let echoed = self.users.update_name(&current.id, &request).await?;

        let mut updated = merge_user(current, echoed);
        updated.name = Some(name);
        session.set_user(updated.clone())?;
        log::info!("Renamed user {}", updated.id);
        Ok(updated)
    }

    pub async fn upload_profile_image(&self, session: &mut Session, file: &UploadFile) -> AppResult<User> {
        let current = require_user(session.state())?.clone();
        validate_profile_image(file)?;

        let echoed = self.users.upload_profile_image(&current.id, file).await?;
        let updated = merge_user(current, echoed);
        session.set_user(updated.clone())?;
        Ok(updated)
    }

    pub async fn profile_image(&self, user_id: &str) -> AppResult<Option<Vec<u8>>> {
        self.users.profile_image(user_id).await
    }

    pub async fn change_password(&self, session: &Session, password: &str, confirmation: &str) -> AppResult<()> {
        validate_new_password(password, confirmation)?;
        let email = require_user(session.state())?
            .email
            .clone()
            .ok_or_else(|| AppError::validation("Email manquant"))?;

        let request = SetPasswordRequest {
            email,
            password: password.to_string(),
        };
        request.validate()?;
        self.users.set_password(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::models::domain::Role;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::services::api_client::ApiClient;
    use crate::services::transport::MockHttpTransport;

    fn signed_in(user: User) -> Session {
        let api = ApiClient::new(
            "http://backend.test",
            Arc::new(MockHttpTransport::new()),
            Arc::new(MemoryTokenStore::new()),
        );
        let mut session = Session::new(api);
        session.set_user(user).unwrap();
        session
    }

    #[tokio::test]
    async fn test_unchanged_name_sends_nothing() {
        let mut users = MockUserRepository::new();
        users.expect_update_name().never();
        let service = UserService::new(Arc::new(users));

        let mut session = signed_in(User::test_teacher("t1").with_name("Mme Rochat"));
        let user = service.update_name(&mut session, "  Mme Rochat ").await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Mme Rochat"));
    }

    #[tokio::test]
    async fn test_update_name_refreshes_session() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_name()
            .withf(|id, request| id == "t1" && request.name == "M. Favre")
            .times(1)
            .returning(|_, _| Ok(Some(User::new("t1", Role::Unknown).with_name("M. Favre"))));
        let service = UserService::new(Arc::new(users));

        let mut session = signed_in(User::test_teacher("t1"));
        let user = service.update_name(&mut session, "M. Favre").await.unwrap();

        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.email.as_deref(), Some("t1@school.ch"));
        assert_eq!(session.user().and_then(|u| u.name.as_deref()), Some("M. Favre"));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_update_name().never();
        let service = UserService::new(Arc::new(users));

        let mut session = signed_in(User::test_student("s1"));
        let err = service.update_name(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_invalid_image_is_rejected_before_upload() {
        let mut users = MockUserRepository::new();
        users.expect_upload_profile_image().never();
        let service = UserService::new(Arc::new(users));

        let mut session = signed_in(User::test_student("s1"));
        let gif = UploadFile::new("a.gif", "image/gif", vec![1, 2, 3]);
        assert!(service.upload_profile_image(&mut session, &gif).await.is_err());
    }

    #[tokio::test]
    async fn test_change_password_uses_session_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_set_password()
            .withf(|request| request.email == "s1@school.ch" && request.password == "secret1")
            .times(1)
            .returning(|_| Ok(()));
        let service = UserService::new(Arc::new(users));

        let session = signed_in(User::test_student("s1"));
        assert!(service.change_password(&session, "secret1", "secret2").await.is_err());
        service.change_password(&session, "secret1", "secret1").await.unwrap();
    }

    #[tokio::test]
    async fn test_anonymous_cannot_edit_profile() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let api = ApiClient::new(
            "http://backend.test",
            Arc::new(MockHttpTransport::new()),
            Arc::new(MemoryTokenStore::new()),
        );
        let mut session = Session::new(api);
        let err = service.update_name(&mut session, "Léa").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
