//! DigitalOcean provider error types

use snapshotter_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigitalOceanError {
    #[error("DigitalOcean API error ({status}) {id}: {message}")]
    Api {
        status: u16,
        id: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DigitalOceanError>;

impl From<DigitalOceanError> for CloudError {
    fn from(err: DigitalOceanError) -> Self {
        match err {
            DigitalOceanError::Api {
                status: 401 | 403,
                message,
                ..
            } => CloudError::AuthenticationFailed(message),
            DigitalOceanError::Api {
                status: 404,
                message,
                ..
            } => CloudError::ResourceNotFound(message),
            DigitalOceanError::Api {
                status,
                id,
                message,
            } => CloudError::ApiError {
                status,
                message: format!("{}: {}", id, message),
            },
            DigitalOceanError::Http(e) => CloudError::Http(e.to_string()),
            DigitalOceanError::InvalidUrl(url) => CloudError::Http(format!("invalid API URL {}", url)),
            DigitalOceanError::InvalidResponse(msg) => CloudError::InvalidResponse(msg),
            DigitalOceanError::JsonError(e) => CloudError::Json(e),
        }
    }
}
