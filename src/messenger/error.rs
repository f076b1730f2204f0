#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MessengerError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request timed out after {secs}s.")]
    Timeout { secs: u64 },

    #[error("Messaging API responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to encode message: {0}")]
    EncodeFailed(#[from] serde_json::Error),
}

impl From<wreq::Error> for MessengerError {
    fn from(e: wreq::Error) -> Self {
        MessengerError::RequestFailed(Box::new(e))
    }
}
