//! Thin HTTP transport over `reqwest`.
//!
//! Bearer auth, JSON bodies, base-URL prefixing, and response-status mapping
//! into [`ApiError`]. Deliberately no transport-layer retry and no pagination
//! handling; long-running operations are driven by [`crate::polling`], not by
//! this layer.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error};

pub(crate) struct Http {
    client: reqwest::Client,
    base_url: String,
    long_poll_timeout: Duration,
}

impl Http {
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the underlying client
    /// cannot be constructed.
    pub(crate) fn new(config: &ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::Config("api_key contains non-header characters".to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            long_poll_timeout: config.long_poll_timeout(),
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(path, self.client.get(self.url(path))).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(path, self.client.post(self.url(path)).json(body))
            .await
    }

    /// POST without a body, for lifecycle verbs like suspend/resume.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(path, self.client.post(self.url(path))).await
    }

    /// POST with the long-poll timeout instead of the ordinary one. The
    /// request must outlive the server's long-poll budget so the 408
    /// continuation answer comes from the server, not from this client.
    pub(crate) async fn post_long_poll<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self
            .client
            .post(self.url(path))
            .json(body)
            .timeout(self.long_poll_timeout);
        self.send(path, req).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(path, self.client.delete(self.url(path))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = req.send().await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "api request completed");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status, &body));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }
}

/// Error response body: `{ "error": { "code", "message" } }`, with a flat
/// `{ "message" }` fallback for older endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn parse_error_body(status: StatusCode, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let (code, message) = match parsed {
        Some(ErrorBody {
            error: Some(detail),
            message,
        }) => (detail.code, detail.message.or(message)),
        Some(ErrorBody { error: None, message }) => (None, message),
        None => (None, None),
    };
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response status")
                .to_string()
        });
    ApiError::api(status.as_u16(), code, message)
}
