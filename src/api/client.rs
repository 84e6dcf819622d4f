//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::transport::{Transport, TransportError};
use super::types::{CourseStats, QueryRequest, QueryResponse};

pub const QUERY_PATH: &str = "/api/query";
pub const COURSES_PATH: &str = "/api/courses";

/// HTTP client for the course-materials backend.
///
/// Plain request/response: no retries, no streaming, no client-side timeout
/// beyond what reqwest reports as a failure.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// `base_url` is the server root, e.g. `http://localhost:8000`. A trailing
    /// slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Checks the status and decodes the body. Non-2xx responses are reported
/// without reading the body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
        info!(
            "POST {} (query_len={}, session={:?})",
            QUERY_PATH,
            request.query.len(),
            request.session_id
        );

        let response = self
            .client
            .post(self.url(QUERY_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Query response status: {}", response.status());

        let result = decode::<QueryResponse>(response).await;
        if let Err(ref e) = result {
            warn!("Query call failed: {}", e);
        }
        result
    }

    async fn course_stats(&self) -> Result<CourseStats, TransportError> {
        debug!("GET {}", COURSES_PATH);

        let response = self
            .client
            .get(self.url(COURSES_PATH))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let result = decode::<CourseStats>(response).await;
        if let Err(ref e) = result {
            warn!("Course stats call failed: {}", e);
        }
        result
    }
}
