//! HTTP transport implementation.
//!
//! Talks JSON to the Save Service with reqwest. The session travels in an
//! optional `Cookie` header set on every request.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::SaveService;
use cloudsave_protocol::{
    AuthStatus, LoadQuery, LoadResponse, SaveRequest, SaveResponse, AUTH_STATUS_PATH, LOAD_PATH,
    SAVE_PATH,
};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest error body quoted in a failure message.
const MAX_ERROR_BODY: usize = 200;

/// HTTP-based Save Service client.
#[derive(Debug, Clone)]
pub struct HttpSaveService {
    /// Base URL of the Save Service, without trailing slash.
    base_url: String,
    client: reqwest::Client,
}

impl HttpSaveService {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if the cookie is not a valid
    /// header value or the client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session_cookie: Option<&str>,
    ) -> SyncResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| SyncError::InvalidConfig(format!("session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Creates a client from the engine configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpSaveService::new`].
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(
            config.server_url.as_str(),
            config.request_timeout,
            config.session_cookie.as_deref(),
        )
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl SaveService for HttpSaveService {
    async fn auth_status(&self) -> SyncResult<AuthStatus> {
        let response = self
            .client
            .get(self.url(AUTH_STATUS_PATH))
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn load(&self, query: &LoadQuery) -> SyncResult<LoadResponse> {
        let response = self
            .client
            .get(self.url(LOAD_PATH))
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    async fn save(&self, request: &SaveRequest) -> SyncResult<SaveResponse> {
        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;
        read_json(response).await
    }

    fn send_beacon(&self, request: SaveRequest) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, emergency save dropped");
            return;
        };

        let client = self.client.clone();
        let url = self.url(SAVE_PATH);
        runtime.spawn(async move {
            match client.post(url).json(&request).send().await {
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "emergency save delivered")
                }
                Err(e) => tracing::debug!(error = %e, "emergency save not delivered"),
            }
        });
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> SyncResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(network_error)?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        let excerpt: String = text.chars().take(MAX_ERROR_BODY).collect();
        return Err(SyncError::RemoteUnavailable(format!("HTTP {status}: {excerpt}")));
    }

    serde_json::from_slice(&body).map_err(|e| SyncError::MalformedPayload(e.to_string()))
}

fn network_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::RemoteUnavailable(err.to_string())
    }
}
