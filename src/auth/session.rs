use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    auth::{
        jwt::decode_payload,
        token_store::{TokenStore, TOKEN_KEY, USER_KEY},
    },
    errors::{AppError, AppResult},
    models::{
        domain::User,
        dto::{request::LoginRequest, response::LoginResponse, wire::FromWire},
    },
    services::api_client::ApiClient,
};

pub const LOGIN_ENDPOINT: &str = "/users/set-password";
pub const MISSING_TOKEN: &str = "Token manquant dans la réponse";
pub const INVALID_TOKEN: &str = "Token invalide (id manquant)";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}

/// Who is signed in. Owned by the caller and passed where needed.
pub struct Session {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    token: Option<SecretString>,
    state: SessionState,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        let tokens = api.tokens().clone();
        Self {
            api,
            tokens,
            token: None,
            state: SessionState::Loading,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Rebuilds the session from storage. A token that does not resolve to
    /// a user is discarded.
    pub fn restore(&mut self) -> AppResult<&SessionState> {
        let token = self.tokens.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let Some(token) = token else {
            self.state = SessionState::Anonymous;
            return Ok(&self.state);
        };

        match self.resolve_user(&token) {
            Ok(user) => {
                self.token = Some(SecretString::from(token));
                self.state = SessionState::Authenticated(user);
            }
            Err(e) => {
                log::warn!("Discarding stored session: {}", e);
                self.logout()?;
            }
        }
        Ok(&self.state)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> AppResult<User> {
        let request = LoginRequest::new(email, password);
        request.validate()?;

        self.tokens.remove(USER_KEY)?;
        let response = LoginResponse::from_value(&self.api.post(LOGIN_ENDPOINT, &request).await?);
        let token = response
            .token
            .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN.to_string()))?;
        self.tokens.set(TOKEN_KEY, &token)?;

        let user = match response.user {
            Some(user) => {
                self.cache_user(&user)?;
                user
            }
            None => match self.resolve_user(&token) {
                Ok(user) => user,
                Err(e) => {
                    self.logout()?;
                    return Err(e);
                }
            },
        };

        log::info!("Signed in as {} ({})", user.id, user.role);
        self.token = Some(SecretString::from(token));
        self.state = SessionState::Authenticated(user.clone());
        Ok(user)
    }

    /// Replaces the signed-in user after a profile edit.
    pub fn set_user(&mut self, user: User) -> AppResult<()> {
        self.cache_user(&user)?;
        self.state = SessionState::Authenticated(user);
        Ok(())
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.tokens.remove(TOKEN_KEY)?;
        self.tokens.remove(USER_KEY)?;
        self.token = None;
        self.state = SessionState::Anonymous;
        Ok(())
    }

    /// Cached user first, then the token payload.
    fn resolve_user(&self, token: &str) -> AppResult<User> {
        if let Some(raw) = self.tokens.get(USER_KEY)? {
            let cached = serde_json::from_str(&raw)
                .ok()
                .and_then(|value| User::from_wire(&value));
            match cached {
                Some(user) => return Ok(user),
                None => log::debug!("Ignoring unreadable cached user"),
            }
        }

        let user = decode_payload(token)
            .and_then(|payload| payload.to_user())
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;
        self.cache_user(&user)?;
        Ok(user)
    }

    fn cache_user(&self, user: &User) -> AppResult<()> {
        self.tokens.set(USER_KEY, &serde_json::to_string(user)?)
    }

    /// Bearer value for callers that build their own requests.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::models::domain::Role;
    use crate::services::transport::{HttpResponse, MockHttpTransport};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_for(claims: serde_json::Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap()
    }

    fn session_with(transport: MockHttpTransport, tokens: Arc<MemoryTokenStore>) -> Session {
        Session::new(ApiClient::new("http://backend.test", Arc::new(transport), tokens))
    }

    fn respond(body: serde_json::Value) -> HttpResponse {
        HttpResponse {
            status: 200,
            content_type: Some("application/json".into()),
            body: body.to_string().into_bytes(),
        }
    }

    #[test]
    fn test_restore_without_token_is_anonymous() {
        let mut session = session_with(MockHttpTransport::new(), Arc::new(MemoryTokenStore::new()));
        assert!(session.state().is_loading());
        assert_eq!(session.restore().unwrap(), &SessionState::Anonymous);
    }

    #[test]
    fn test_restore_prefers_cached_user() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.set(TOKEN_KEY, &token_for(json!({"id": "jwt-user", "role": "student"}))).unwrap();
        tokens
            .set(USER_KEY, &serde_json::to_string(&User::test_teacher("cached")).unwrap())
            .unwrap();

        let mut session = session_with(MockHttpTransport::new(), tokens);
        session.restore().unwrap();
        assert_eq!(session.user().unwrap().id, "cached");
        assert!(session.bearer().unwrap().starts_with("Bearer "));
    }

    #[test]
    fn test_restore_falls_back_to_token_payload() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.set(TOKEN_KEY, &token_for(json!({"_id": "u7", "type": "Teacher"}))).unwrap();

        let mut session = session_with(MockHttpTransport::new(), tokens.clone());
        session.restore().unwrap();
        let user = session.user().unwrap();
        assert_eq!(user.id, "u7");
        assert_eq!(user.role, Role::Teacher);

        let cached: serde_json::Value = serde_json::from_str(&tokens.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(User::from_wire(&cached).as_ref(), Some(user));
    }

    #[test]
    fn test_restore_discards_token_without_id() {
        let tokens = Arc::new(MemoryTokenStore::new());
        tokens.set(TOKEN_KEY, &token_for(json!({"role": "student"}))).unwrap();

        let mut session = session_with(MockHttpTransport::new(), tokens.clone());
        assert_eq!(session.restore().unwrap(), &SessionState::Anonymous);
        assert_eq!(tokens.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_stores_token_and_user() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url == "http://backend.test/api/users/set-password")
            .returning(|_| Ok(respond(json!({"token": "t.o.k", "user": {"_id": "u1", "type": "student"}}))));

        let tokens = Arc::new(MemoryTokenStore::new());
        let mut session = session_with(transport, tokens.clone());
        let user = session.login("eleve@school.ch", "secret").await.unwrap();

        assert_eq!(user.role, Role::Student);
        assert_eq!(tokens.get(TOKEN_KEY).unwrap().as_deref(), Some("t.o.k"));
        assert!(tokens.get(USER_KEY).unwrap().is_some());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(respond(json!({"message": "ok"}))));

        let mut session = session_with(transport, Arc::new(MemoryTokenStore::new()));
        let err = session.login("eleve@school.ch", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), format!("Unauthorized: {}", MISSING_TOKEN));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_clears_storage() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let mut session = session_with(MockHttpTransport::new(), tokens.clone());
        tokens.set(TOKEN_KEY, "t").unwrap();
        session.set_user(User::test_student("s1")).unwrap();

        session.logout().unwrap();
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(tokens.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(tokens.get(USER_KEY).unwrap(), None);
    }
}
