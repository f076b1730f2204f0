use crate::feed::error::FeedError;
use crate::repository::error::DatabaseError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("Unexpected result: {message}")]
    UnexpectedResult { message: String },

    #[error("FeedError: {0}")]
    FeedError(#[from] FeedError),

    #[error("DatabaseError: {0}")]
    DatabaseError(#[from] DatabaseError),
}
