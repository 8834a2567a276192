//! Hosted backend HTTP client
//!
//! Thin wrapper over `reqwest` that knows the service base URL and API key
//! and turns non-success responses into [`UpstreamError`].

use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use std::time::Duration;

/// Error raised by the service client
#[derive(Debug, thiserror::Error)]
pub enum ServiceClientError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(reqwest::Error),

    /// Network failure, timeout, or unreadable body
    #[error("Backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{0}")]
    Upstream(#[from] UpstreamError),
}

/// Non-success answer from the hosted service
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct UpstreamError {
    pub status: StatusCode,
    /// Machine-readable code if the service sent one (e.g. `PGRST116`)
    pub code: Option<String>,
    /// Human-readable message suitable for a notification
    pub message: String,
}

/// Error bodies differ between the auth and data endpoints; accept all shapes.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
    code: Option<serde_json::Value>,
}

impl UpstreamError {
    /// Build from a status and a raw response body
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        let message = parsed
            .error_description
            .or(parsed.msg)
            .or(parsed.message)
            .or(parsed.error.clone())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });

        let code = parsed
            .error_code
            .or_else(|| match parsed.code {
                Some(serde_json::Value::String(s)) => Some(s),
                _ => None,
            })
            .or(parsed.error);

        Self {
            status,
            code,
            message,
        }
    }
}

/// Client for one hosted backend project
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ServiceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ServiceClientError::Build)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a service path such as `/auth/v1/signup`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the project API key. `bearer` overrides the
    /// Authorization token (a user access token or a privileged key).
    pub fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.api_key);
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Send a request and fail on a non-success status
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = UpstreamError::from_body(status, &body);
        tracing::debug!(status = %status, code = ?err.code, "Backend returned an error");
        Err(err.into())
    }
}
