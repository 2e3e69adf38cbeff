use thiserror::Error;

pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 403 and 404 on optional resources mean "absent", not "failed".
    pub fn is_missing_resource(&self) -> bool {
        matches!(self.status(), Some(403) | Some(404))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Http { .. } => "HTTP_ERROR",
            AppError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_backend_message() {
        let err = AppError::Http {
            status: 400,
            message: "Classe introuvable".into(),
        };
        assert_eq!(err.to_string(), "Classe introuvable");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_missing_resource_statuses() {
        let forbidden = AppError::Http {
            status: 403,
            message: GENERIC_REQUEST_FAILURE.into(),
        };
        let missing = AppError::Http {
            status: 404,
            message: GENERIC_REQUEST_FAILURE.into(),
        };
        let server = AppError::Http {
            status: 500,
            message: GENERIC_REQUEST_FAILURE.into(),
        };

        assert!(forbidden.is_missing_resource());
        assert!(missing.is_missing_resource());
        assert!(!server.is_missing_resource());
        assert!(!AppError::Network("down".into()).is_missing_resource());
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::validation("Nom vide");
        assert_eq!(err.to_string(), "Validation error: Nom vide");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
