use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::token_store::{TokenStore, TOKEN_KEY},
    config::normalize_base_url,
    errors::AppResult,
    services::{
        http_helpers::{http_error, parse_body, with_api_prefix},
        transport::{FormPart, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody},
    },
};

/// Authenticated JSON client for the Studeasy REST backend.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            transport,
            tokens,
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, with_api_prefix(endpoint))
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub async fn get(&self, endpoint: &str) -> AppResult<Value> {
        self.json(HttpMethod::Get, endpoint, RequestBody::Empty).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> AppResult<Value> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.json(HttpMethod::Post, endpoint, body).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> AppResult<Value> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.json(HttpMethod::Put, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &str) -> AppResult<Value> {
        self.json(HttpMethod::Delete, endpoint, RequestBody::Empty).await
    }

    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AppResult<Value> {
        let body = RequestBody::Json(serde_json::to_value(body)?);
        self.json(HttpMethod::Delete, endpoint, body).await
    }

    pub async fn post_multipart(&self, endpoint: &str, parts: Vec<FormPart>) -> AppResult<Value> {
        self.json(HttpMethod::Post, endpoint, RequestBody::Multipart(parts))
            .await
    }

    /// Raw body of a successful response (images, documents).
    pub async fn get_bytes(&self, endpoint: &str) -> AppResult<Vec<u8>> {
        let response = self.send(HttpMethod::Get, endpoint, RequestBody::Empty).await?;
        Ok(response.body)
    }

    async fn json(&self, method: HttpMethod, endpoint: &str, body: RequestBody) -> AppResult<Value> {
        let response = self.send(method, endpoint, body).await?;
        Ok(parse_body(&response))
    }

    async fn send(&self, method: HttpMethod, endpoint: &str, body: RequestBody) -> AppResult<HttpResponse> {
        let mut request = HttpRequest::new(method, &self.url(endpoint));

        if !matches!(body, RequestBody::Multipart(_)) {
            request = request.with_header("Content-Type", "application/json");
        }
        if let Some(token) = self.tokens.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) {
            request = request.with_header("Authorization", &format!("Bearer {}", token));
        }

        let response = self.transport.send(request.with_body(body)).await?;
        log::debug!("{} {} -> {}", method.as_str(), endpoint, response.status);

        if !response.is_success() {
            return Err(http_error(&response));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::MemoryTokenStore;
    use crate::errors::{AppError, GENERIC_REQUEST_FAILURE};
    use crate::services::transport::MockHttpTransport;
    use serde_json::json;

    fn ok_json(body: Value) -> HttpResponse {
        HttpResponse {
            status: 200,
            content_type: Some("application/json".into()),
            body: body.to_string().into_bytes(),
        }
    }

    fn client(transport: MockHttpTransport, token: Option<&str>) -> ApiClient {
        let tokens = Arc::new(MemoryTokenStore::new());
        if let Some(token) = token {
            tokens.set(TOKEN_KEY, token).unwrap();
        }
        ApiClient::new("http://backend.test/", Arc::new(transport), tokens)
    }

    #[tokio::test]
    async fn test_get_attaches_prefix_and_bearer() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url == "http://backend.test/api/classes"
                    && req.header("Authorization") == Some("Bearer tok")
                    && req.header("Content-Type") == Some("application/json")
            })
            .times(1)
            .returning(|_| Ok(ok_json(json!([{"_id": "c1"}]))));

        let body = client(transport, Some("tok")).get("classes").await.unwrap();
        assert_eq!(body[0]["_id"], "c1");
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_authorization() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.header("Authorization").is_none())
            .returning(|_| Ok(ok_json(json!({"token": "t"}))));

        let body = client(transport, None)
            .post("/users/set-password", &json!({"email": "a@b.c", "password": "secret"}))
            .await
            .unwrap();
        assert_eq!(body["token"], "t");
    }

    #[tokio::test]
    async fn test_multipart_has_no_forced_content_type() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.header("Content-Type").is_none() && matches!(req.body, RequestBody::Multipart(_)))
            .returning(|_| Ok(ok_json(json!({"ok": true}))));

        let parts = vec![FormPart::Text {
            name: "title".into(),
            value: "Optique".into(),
        }];
        client(transport, Some("tok"))
            .post_multipart("/subjects/class/c1", parts)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_maps_to_http_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse {
                status: 500,
                content_type: Some("text/html".into()),
                body: b"<html>boom</html>".to_vec(),
            })
        });

        let err = client(transport, None).delete("/classes/c1").await.unwrap_err();
        match err {
            AppError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, GENERIC_REQUEST_FAILURE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(AppError::Network("connection refused".into())));

        let err = client(transport, None).get("/classes").await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }
}
