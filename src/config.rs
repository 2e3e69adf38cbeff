use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_DIR: &str = ".studeasy";
pub const DEFAULT_INSIGHTS_CONCURRENCY: usize = 5;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub storage_dir: PathBuf,
    pub insights_concurrency: usize,
    pub request_timeout: Option<Duration>,
    pub log_filter: String,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self {
            api_url: normalize_base_url(
                &env::var("STUDEASY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            storage_dir: env::var("STUDEASY_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR)),
            insights_concurrency: env::var("STUDEASY_INSIGHTS_CONCURRENCY")
                .ok()
                .and_then(|c| c.parse::<usize>().ok())
                .filter(|c| *c >= 1)
                .unwrap_or(DEFAULT_INSIGHTS_CONCURRENCY),
            request_timeout: env::var("STUDEASY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse::<u64>().ok())
                .map(Duration::from_secs),
            log_filter: env::var("STUDEASY_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_base_url(api_url);
        self
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".to_string(),
            storage_dir: env::temp_dir().join("studeasy-test"),
            insights_concurrency: 2,
            request_timeout: Some(Duration::from_secs(5)),
            log_filter: "debug".to_string(),
        }
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
