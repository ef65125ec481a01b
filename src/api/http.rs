use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::{ClientError, ClientResult};

/// Production transport backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("could not build HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let mut builder = self.http_client.request(request.method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(format!("failed reading response body: {}", e)))?;

        Ok(ApiResponse { status, body })
    }
}
