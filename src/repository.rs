//! Database module with SQLite storage and SQLx.

use std::str::FromStr;

use log::debug;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use crate::repository::error::DatabaseError;
use crate::repository::table::MatchStateTable;
use crate::repository::table::MessageLogTable;
use crate::repository::table::UserTable;

pub mod error;
pub mod table;

/// Main database struct containing all table handlers.
///
/// Shared between the webhook handlers and the match update poller; every
/// write goes straight to SQLite so either side sees the other's changes on
/// its next read.
pub struct Repository {
    pool: SqlitePool,
    pub user: UserTable,
    pub match_state: MatchStateTable,
    pub message_log: MessageLogTable,
}

impl Repository {
    /// Creates a new database connection and initializes table handlers.
    pub async fn new(db_url: &str, db_path: &str) -> Result<Self, DatabaseError> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            debug!("Database path {db_path} does not exist. Creating...");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "")?;
            info!("Created {db_path}");
        }

        debug!("Connecting to db...");
        let opts = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(opts).await?;
        info!("Connected to db.");

        Ok(Self {
            user: UserTable::new(pool.clone()),
            match_state: MatchStateTable::new(pool.clone()),
            message_log: MessageLogTable::new(pool.clone()),
            pool,
        })
    }

    /// Runs database migrations from the migrations directory.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// The shared connection pool, for statements outside the table
    /// handlers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
