use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selection: {0}")]
    Validation(String),

    #[error("Template not compatible: {0}")]
    Incompatible(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission error: {0}")]
    Permission(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A generation is already in progress: {0}")]
    Busy(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Generation stream failed: {0}")]
    Stream(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ReportError::Timeout(e.to_string())
        } else if e.is_decode() {
            ReportError::Backend(format!("Malformed response: {}", e))
        } else {
            ReportError::Network(e.to_string())
        }
    }
}
