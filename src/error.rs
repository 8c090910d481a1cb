use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while assembling the [`AppConfig`](crate::config::app_config::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Errors from the backend exchanges. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to {operation}: request could not be sent")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to {operation}, status code: {status}, response body: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to {operation}: response body could not be decoded")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// A page measurement that did not produce a result.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("invalid page URL")]
    InvalidUrl(#[from] url::ParseError),

    #[error("page could not be loaded")]
    Transport(#[from] reqwest::Error),

    #[error("page load exceeded {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("backend error")]
    Backend(#[from] BackendError),
}

/// Renders an error followed by its whole `source()` chain.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}
