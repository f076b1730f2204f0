#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DatabaseError {
    #[error("Internal database error: {0}")]
    BackendError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to prepare database file: {0}")]
    IoError(#[from] std::io::Error),
}
