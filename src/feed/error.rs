#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request timed out after {secs}s.")]
    Timeout { secs: u64 },

    #[error("Feed API responded with status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("Invalid data from API: {message}")]
    InvalidData { message: String },
}

impl From<wreq::Error> for FeedError {
    fn from(e: wreq::Error) -> Self {
        FeedError::RequestFailed(Box::new(e))
    }
}
