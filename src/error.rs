use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to reach service: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. Displays the way the browser client showed
    /// `statusText`.
    #[error("Error: {reason}")]
    Status { status: u16, reason: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Backend(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
