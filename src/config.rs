//! Configuration management for plsort.
//!
//! Values come from environment variables, optionally pre-loaded from a
//! `.env` file in the local data directory:
//!
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults (everything except the access token)
//!
//! | Variable               | Default                        |
//! |------------------------|--------------------------------|
//! | `SPOTIFY_ACCESS_TOKEN` | required                       |
//! | `SPOTIFY_API_URL`      | `https://api.spotify.com/v1`   |
//! | `PLSORT_PAGE_SIZE`     | `100` (1..=100)                |
//! | `PLSORT_BATCH_SIZE`    | `100` (1..=100)                |
//! | `PLSORT_MAX_ATTEMPTS`  | `4`                            |
//! | `PLSORT_TIMEOUT_SECS`  | `30`                           |
//! | `PLSORT_LOG`           | `warn`                         |

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    engine::{DEFAULT_BATCH_SIZE, EngineConfig, RetryPolicy},
    spotify::{Credential, MAX_PAGE_SIZE, MAX_WRITE_BATCH},
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot prepare config directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read {path}: {message}")]
    EnvFile { path: PathBuf, message: String },
}

/// Everything the binary needs to build a client and an engine.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credential: Credential,
    pub api_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub engine: EngineConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout = request_timeout()?;
        Ok(Self {
            credential: spotify_access_token()?,
            api_url: spotify_apiurl(),
            page_size: page_size()?,
            timeout,
            engine: EngineConfig {
                batch_size: batch_size()?,
                retry: RetryPolicy {
                    max_attempts: max_attempts()?,
                    call_timeout: timeout,
                    ..RetryPolicy::default()
                },
            },
        })
    }
}

/// Path of the `.env` file: `<data_local_dir>/plsort/.env`.
///
/// - Linux: `~/.local/share/plsort/.env`
/// - macOS: `~/Library/Application Support/plsort/.env`
/// - Windows: `%LOCALAPPDATA%/plsort/.env`
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plsort/.env");
    path
}

/// Loads variables from the `.env` file, if there is one.
///
/// Creates the directory so users find the place to put it. Variables
/// already set in the environment are not overridden.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Returns the access token used as bearer credential.
pub fn spotify_access_token() -> Result<Credential, ConfigError> {
    match env::var("SPOTIFY_ACCESS_TOKEN") {
        Ok(token) if !token.trim().is_empty() => Ok(Credential::bearer(token.trim())),
        _ => Err(ConfigError::Missing("SPOTIFY_ACCESS_TOKEN")),
    }
}

/// Returns the Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

pub fn page_size() -> Result<u32, ConfigError> {
    parse_bounded(
        "PLSORT_PAGE_SIZE",
        env::var("PLSORT_PAGE_SIZE").ok(),
        MAX_PAGE_SIZE,
        1,
        MAX_PAGE_SIZE,
    )
}

pub fn batch_size() -> Result<usize, ConfigError> {
    parse_bounded(
        "PLSORT_BATCH_SIZE",
        env::var("PLSORT_BATCH_SIZE").ok(),
        DEFAULT_BATCH_SIZE,
        1,
        MAX_WRITE_BATCH,
    )
}

pub fn max_attempts() -> Result<u32, ConfigError> {
    parse_bounded(
        "PLSORT_MAX_ATTEMPTS",
        env::var("PLSORT_MAX_ATTEMPTS").ok(),
        RetryPolicy::default().max_attempts,
        1,
        10,
    )
}

pub fn request_timeout() -> Result<Duration, ConfigError> {
    parse_bounded(
        "PLSORT_TIMEOUT_SECS",
        env::var("PLSORT_TIMEOUT_SECS").ok(),
        30u64,
        1,
        600,
    )
    .map(Duration::from_secs)
}

/// Filter directive for the tracing subscriber.
pub fn log_filter() -> String {
    env::var("PLSORT_LOG").unwrap_or_else(|_| "warn".to_string())
}

/// Parses `raw` or falls back to `default` when unset; values outside
/// `min..=max` are errors.
pub fn parse_bounded<T>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    min: T,
    max: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.clone(),
        reason: "not a number".to_string(),
    })?;

    if value < min || value > max {
        return Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: format!("must be between {min} and {max}"),
        });
    }

    Ok(value)
}
