use serde_json::Value;

use crate::errors::{AppError, GENERIC_REQUEST_FAILURE};
use crate::services::transport::HttpResponse;

pub const API_PREFIX: &str = "/api";

/// Ensures a leading `/` and the `/api` prefix.
pub fn with_api_prefix(endpoint: &str) -> String {
    let path = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    };

    if path == API_PREFIX || path.starts_with("/api/") || path.starts_with("/api?") {
        path
    } else {
        format!("{}{}", API_PREFIX, path)
    }
}

/// JSON when the body parses, the raw text otherwise, `null` when empty.
pub fn parse_body(response: &HttpResponse) -> Value {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => value,
        Err(e) => {
            if declares_json(response) {
                log::warn!("Response declared JSON but did not parse: {}", e);
            }
            Value::String(response.text())
        }
    }
}

fn declares_json(response: &HttpResponse) -> bool {
    response
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// `error`, then `message`, else the generic failure text.
pub fn error_message(body: &Value) -> String {
    ["error", "message"]
        .iter()
        .filter_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(GENERIC_REQUEST_FAILURE)
        .to_string()
}

/// Maps a non-2xx response to `AppError::Http`.
pub fn http_error(response: &HttpResponse) -> AppError {
    let body = parse_body(response);
    AppError::Http {
        status: response.status,
        message: error_message(&body),
    }
}
