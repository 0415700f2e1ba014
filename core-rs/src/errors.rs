//! Error types for the qrmenu access-control core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrMenuError {
    #[error("Session check failed: {0}")]
    SessionCheck(String),

    #[error("Role fetch failed: {0}")]
    RoleFetch(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid role label: {0}")]
    InvalidRole(String),

    #[error("Role store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for QrMenuError {
    fn from(err: reqwest::Error) -> Self {
        QrMenuError::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QrMenuError>;
