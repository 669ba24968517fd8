use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{engine::ApiError, types::ErrorResponse};

/// Largest page the playlist tracks endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest number of URIs the replace and add endpoints accept.
pub const MAX_WRITE_BATCH: usize = 100;

/// An already valid access token.
///
/// The client never obtains or refreshes it; an expired token surfaces as
/// [`ApiError::Auth`].
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Spotify Web API adapter used by the reordering engine.
pub struct SpotifyClient {
    http: Client,
    credential: Credential,
    api_url: String,
    page_size: u32,
}

impl SpotifyClient {
    pub fn new(
        credential: Credential,
        api_url: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            credential,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(self.credential.token())
    }

    pub(crate) fn put(&self, url: &str) -> RequestBuilder {
        self.http.put(url).bearer_auth(self.credential.token())
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(self.credential.token())
    }

    /// Sends `request` and decodes a successful JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Malformed(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = parse_retry_after(
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
    );
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status.to_string());
    debug!(%status, %message, "spotify request failed");

    Err(map_status(status, message, retry_after))
}

pub(crate) fn map_status(
    status: StatusCode,
    message: String,
    retry_after: Option<Duration>,
) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Auth(message),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after },
        StatusCode::REQUEST_TIMEOUT => ApiError::Timeout,
        s if s.is_server_error() => ApiError::Server {
            status: s.as_u16(),
            message,
            retry_after,
        },
        s => ApiError::Rejected(format!("{s}: {message}")),
    }
}

pub(crate) fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|r| r.error.message)
}
