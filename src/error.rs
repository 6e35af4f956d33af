use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// Anything that can go wrong talking to one of the HTTP services.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(#[from] curl::Error),

    #[error("service answered with status {0}")]
    Status(u32),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service rejected the request: {0}")]
    Rejected(String),

    #[error("request task did not finish: {0}")]
    Interrupted(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

impl From<std::str::Utf8Error> for FetchError {
    fn from(err: std::str::Utf8Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        FetchError::Interrupted(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    #[error("user denied the geolocation request")]
    PermissionDenied,

    #[error("position unavailable")]
    Unavailable,

    #[error("position request timed out")]
    Timeout,

    #[error("geolocation is not supported by the host")]
    Unsupported,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
