use std::sync::Arc;

use crate::{
    auth::{FileTokenStore, Session, TokenStore},
    config::Config,
    errors::AppResult,
    repositories::{HttpClassRepository, HttpQuizAttemptRepository, HttpSubjectRepository, HttpUserRepository},
    services::{
        api_client::ApiClient,
        class_service::ClassService,
        insights_service::InsightsService,
        progress_service::ProgressService,
        quiz_attempt_service::QuizAttemptService,
        quiz_authoring::QuizAuthoringService,
        transport::{HttpTransport, ReqwestTransport},
        user_service::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub class_service: Arc<ClassService>,
    pub quiz_authoring: Arc<QuizAuthoringService>,
    pub quiz_attempt_service: Arc<QuizAttemptService>,
    pub insights_service: Arc<InsightsService>,
    pub progress_service: Arc<ProgressService>,
    pub user_service: Arc<UserService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the reqwest transport and the on-disk token store.
    pub fn new(config: Config) -> AppResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        let tokens = Arc::new(FileTokenStore::open(&config.storage_dir)?);
        Ok(Self::with_transport(config, transport, tokens))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        let api = ApiClient::new(&config.api_url, transport, tokens);

        let class_repository = Arc::new(HttpClassRepository::new(api.clone()));
        let subject_repository = Arc::new(HttpSubjectRepository::new(api.clone()));
        let attempt_repository = Arc::new(HttpQuizAttemptRepository::new(api.clone()));
        let user_repository = Arc::new(HttpUserRepository::new(api.clone()));

        log::info!("Backend at {}", config.api_url);

        Self {
            class_service: Arc::new(ClassService::new(class_repository.clone())),
            quiz_authoring: Arc::new(QuizAuthoringService::new(subject_repository.clone())),
            quiz_attempt_service: Arc::new(QuizAttemptService::new(
                subject_repository.clone(),
                attempt_repository.clone(),
            )),
            insights_service: Arc::new(InsightsService::new(
                class_repository.clone(),
                subject_repository.clone(),
                attempt_repository.clone(),
                config.insights_concurrency,
            )),
            progress_service: Arc::new(ProgressService::new(
                class_repository,
                subject_repository,
                attempt_repository,
            )),
            user_service: Arc::new(UserService::new(user_repository)),
            api,
            config: Arc::new(config),
        }
    }

    /// A fresh session sharing this state's client and token store. Call
    /// `restore` on it before use.
    pub fn session(&self) -> Session {
        Session::new(self.api.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, SessionState, TOKEN_KEY};
    use crate::services::transport::MockHttpTransport;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_sessions_share_token_store() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let state = AppState::with_transport(Config::test_config(), Arc::new(MockHttpTransport::new()), tokens.clone());

        let mut session = state.session();
        assert!(session.state().is_loading());
        assert_eq!(session.restore().unwrap(), &SessionState::Anonymous);

        tokens.set(TOKEN_KEY, "not-a-jwt").unwrap();
        let mut again = state.session();
        assert_eq!(again.restore().unwrap(), &SessionState::Anonymous);
        assert_eq!(tokens.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_new_uses_configured_storage() {
        let mut config = Config::test_config();
        config.storage_dir = std::env::temp_dir().join(format!("studeasy-state-{}", uuid::Uuid::new_v4()));
        let state = AppState::new(config).unwrap();
        assert_eq!(state.api.url("/classes"), "http://127.0.0.1:3000/api/classes");
    }
}
