//! Outbound calls to the SafeSphere HTTP API.
//!
//! - [`Transport`]: the raw request/response seam ([`ReqwestTransport`] in production)
//! - [`ApiGateway`]: common header/auth/error envelope around every call
//! - [`SafeSphereApi`]: typed wrappers, one per endpoint

pub mod endpoints;
pub mod http;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

pub use endpoints::SafeSphereApi;
pub use http::ReqwestTransport;

/// A fully-built request, ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Carries a request to the server and brings back whatever it answered.
///
/// Implementations only fail for transport problems; HTTP error statuses are
/// returned as ordinary responses and classified by [`ApiGateway`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Wraps every call with the JSON and bearer headers and maps failures onto
/// [`ClientError`]. Owns the session store so the token it attaches is always
/// the current one. No retries happen here.
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiGateway {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }

    fn build_request(&self, endpoint: &str, method: Method, body: Option<Value>) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.session.get() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        ApiRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body,
        }
    }

    /// Perform one call and return the decoded JSON body.
    pub async fn call(&self, endpoint: &str, method: Method, body: Option<Value>) -> ClientResult<Value> {
        let request = self.build_request(endpoint, method, body);
        tracing::debug!(method = %request.method, endpoint, "api call");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, "api call failed: {}", e);
                return Err(e);
            }
        };

        classify(response)
    }

    /// Like [`call`](Self::call), decoding the body into `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let value = self.call(endpoint, method, body).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{}: {}", endpoint, e)))
    }
}

fn classify(response: ApiResponse) -> ClientResult<Value> {
    let status = response.status;

    if (200..300).contains(&status) {
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&response.body).map_err(ClientError::from);
    }

    let server_message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.error);

    if status == 401 {
        return Err(ClientError::Auth(
            server_message.unwrap_or_else(|| "Not authenticated".to_string()),
        ));
    }

    Err(ClientError::Api {
        status,
        message: server_message.unwrap_or_else(|| format!("API Error: {}", status)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionBackend;
    use crate::testing::FakeTransport;
    use serde_json::json;

    fn gateway(transport: Arc<FakeTransport>, token: Option<&str>) -> ApiGateway {
        let backend = match token {
            Some(t) => MemorySessionBackend::with_token(t),
            None => MemorySessionBackend::default(),
        };
        ApiGateway::new("http://api.test/", transport, SessionStore::open(Box::new(backend)))
    }

    #[tokio::test]
    async fn test_attaches_bearer_when_session_exists() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/health", 200, json!({"status": "healthy"}));

        let gw = gateway(transport.clone(), Some("tok"));
        gw.call("/health", Method::GET, None).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://api.test/health");
        assert_eq!(sent[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(sent[0].header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_authorization_without_session() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/health", 200, json!({"status": "healthy"}));

        let gw = gateway(transport.clone(), None);
        gw.call("/health", Method::GET, None).await.unwrap();

        assert_eq!(transport.requests()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_401_is_auth_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/friends/", 401, json!({"error": "Not authenticated"}));

        let gw = gateway(transport, Some("expired"));
        let err = gw.call("/friends/", Method::GET, None).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[tokio::test]
    async fn test_non_2xx_carries_server_message() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::POST, "/friends/request", 409, json!({"error": "already requested"}));

        let gw = gateway(transport, Some("tok"));
        let err = gw
            .call("/friends/request", Method::POST, Some(json!({"friend_email": "x@example.com"})))
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "already requested");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_falls_back_to_status() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond_raw(Method::GET, "/health", 502, "<html>Bad Gateway</html>");

        let gw = gateway(transport, None);
        let err = gw.call("/health", Method::GET, None).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: 502");
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(Method::GET, "/health", "connection refused");

        let gw = gateway(transport, None);
        let err = gw.call("/health", Method::GET, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond_raw(Method::POST, "/auth/logout", 200, "");

        let gw = gateway(transport, Some("tok"));
        let value = gw.call("/auth/logout", Method::POST, None).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_call_json_decode_failure() {
        let transport = Arc::new(FakeTransport::new());
        transport.respond(Method::GET, "/users/profile", 200, json!([1, 2, 3]));

        let gw = gateway(transport, Some("tok"));
        let result: ClientResult<crate::models::User> =
            gw.call_json("/users/profile", Method::GET, None).await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
