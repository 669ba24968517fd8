use std::time::Duration;

use thiserror::Error;

/// Failure reported by a [`PlaylistApi`](crate::engine::remote::PlaylistApi)
/// implementation for a single remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("not found or not accessible: {0}")]
    NotFound(String),

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error {status}: {message}")]
    Server {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Timeouts, network failures, 5xx and rate limiting are worth another
    /// attempt. Everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited { .. }
                | ApiError::Server { .. }
                | ApiError::Timeout
                | ApiError::Network(_)
        )
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after } | ApiError::Server { retry_after, .. } => {
                *retry_after
            }
            _ => None,
        }
    }
}

/// Error taxonomy of the reordering engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("authentication failed, re-authenticate and retry: {0}")]
    Auth(String),

    #[error("playlist {playlist_id} not found or not accessible")]
    NotFound { playlist_id: String },

    #[error("unknown sort key {0:?} (expected one of: Name, Artist, Album, Release Date, Popularity)")]
    UnknownSortKey(String),

    #[error("remote API still failing after {attempts} attempt(s): {message}")]
    Transient { attempts: u32, message: String },

    #[error("playlist {playlist_id}: fetched {actual} of {expected} tracks")]
    PartialFetch {
        playlist_id: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "playlist {playlist_id}: write incomplete, {committed} of {expected} tracks committed{}",
        cause_suffix(.cause)
    )]
    WriteIncomplete {
        playlist_id: String,
        expected: usize,
        committed: usize,
        cause: Option<String>,
    },

    #[error("playlist {playlist_id} changed remotely (revision {expected} is now {actual})")]
    Conflict {
        playlist_id: String,
        expected: String,
        actual: String,
    },

    #[error("a sort of playlist {playlist_id} is already in progress")]
    AlreadyInProgress { playlist_id: String },

    #[error("request rejected by the remote API: {0}")]
    Rejected(String),

    #[error("operation cancelled")]
    Cancelled,
}

fn cause_suffix(cause: &Option<String>) -> String {
    cause.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl EngineError {
    /// Translates the final error of a remote call on `playlist_id`.
    pub(crate) fn from_api(playlist_id: &str, attempts: u32, err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => EngineError::Auth(msg),
            ApiError::NotFound(_) => EngineError::NotFound {
                playlist_id: playlist_id.to_string(),
            },
            ApiError::Rejected(msg) | ApiError::Malformed(msg) => EngineError::Rejected(msg),
            transient => EngineError::Transient {
                attempts,
                message: transient.to_string(),
            },
        }
    }

    /// True when the remote playlist may not match either the old or the
    /// intended order.
    pub fn leaves_remote_inconsistent(&self) -> bool {
        matches!(self, EngineError::WriteIncomplete { .. })
    }
}

/// An engine failure tagged with the operation it belongs to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sorting playlist {playlist_id} by {sort_key}: {kind}")]
pub struct SortError {
    pub playlist_id: String,
    pub sort_key: String,
    #[source]
    pub kind: EngineError,
}

impl SortError {
    pub fn new(playlist_id: &str, sort_key: &str, kind: EngineError) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
            sort_key: sort_key.to_string(),
            kind,
        }
    }

    pub fn kind(&self) -> &EngineError {
        &self.kind
    }
}
