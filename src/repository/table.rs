//! Database table operations and implementations.

use chrono::DateTime;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteArguments;

use crate::entity::MatchStateModel;
use crate::entity::MessageLogModel;
use crate::entity::UserModel;
use crate::repository::error::DatabaseError;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Primary-key operations generated for every table.
#[async_trait::async_trait]
pub trait Table<T, ID> {
    async fn insert(&self, model: &T) -> Result<ID, DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    /// Inserts or overwrites the row with the model's primary key.
    async fn replace(&self, model: &T) -> Result<ID, DatabaseError>;
}

/// Helper trait so the table macro can bind any model field by reference.
pub trait BindParam<'q> {
    fn bind_param<O>(
        self,
        query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>;
}

macro_rules! impl_bind_param {
    ($t:ty) => {
        impl<'q> BindParam<'q> for $t {
            fn bind_param<O>(
                self,
                query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
            ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>> {
                query.bind(self)
            }
        }
    };
}

impl_bind_param!(&'q bool);
impl_bind_param!(&'q String);
impl_bind_param!(&'q Option<i32>);
impl_bind_param!(&'q DateTime<Utc>);

/// Generates a table handler keyed by a TEXT primary key.
///
/// `$cols` and `$vals` must list the same fields, in the same order, as the
/// trailing field list. The primary key is part of that list. The schema
/// itself lives in `migrations/`.
macro_rules! impl_table {
    (
        $struct_name:ident,
        $model:ty,
        $table:expr,
        $pk:ident,
        $cols:expr,
        $vals:expr,
        [ $( $field:ident ),+ ]
    ) => {
        #[derive(Clone)]
        pub struct $struct_name {
            base: BaseTable,
        }

        impl $struct_name {
            pub fn new(pool: SqlitePool) -> Self {
                Self {
                    base: BaseTable::new(pool),
                }
            }
        }

        #[async_trait::async_trait]
        impl Table<$model, String> for $struct_name {
            async fn select(&self, id: &String) -> Result<Option<$model>, DatabaseError> {
                let query = sqlx::query_as::<_, $model>(concat!(
                    "SELECT * FROM ", $table, " WHERE ", stringify!($pk), " = ?"
                ));
                let query = BindParam::bind_param(id, query);
                Ok(query.fetch_optional(&self.base.pool).await?)
            }

            async fn insert(&self, model: &$model) -> Result<String, DatabaseError> {
                let mut query = sqlx::query_as(concat!(
                    "INSERT INTO ", $table, " (", $cols, ") VALUES (", $vals, ") RETURNING ", stringify!($pk)
                ));

                $(
                    query = BindParam::bind_param(&model.$field, query);
                )+

                let row: (String,) = query.fetch_one(&self.base.pool).await?;
                Ok(row.0)
            }

            async fn replace(&self, model: &$model) -> Result<String, DatabaseError> {
                let mut query = sqlx::query_as(concat!(
                    "REPLACE INTO ", $table, " (", $cols, ") VALUES (", $vals, ") RETURNING ", stringify!($pk)
                ));

                $(
                    query = BindParam::bind_param(&model.$field, query);
                )+

                let row: (String,) = query.fetch_one(&self.base.pool).await?;
                Ok(row.0)
            }
        }
    };
}

// ============================================================================
// UserTable
// ============================================================================

impl_table!(
    UserTable,
    UserModel,
    "users",
    phone,
    "phone, auto_updates, leagues, created_at",
    "?, ?, ?, ?",
    [phone, auto_updates, leagues, created_at]
);

impl UserTable {
    /// Users that opted into push notifications.
    pub async fn select_all_with_auto_updates(&self) -> Result<Vec<UserModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, UserModel>(
            "SELECT * FROM users WHERE auto_updates = 1 ORDER BY phone",
        )
        .fetch_all(&self.base.pool)
        .await?)
    }

    pub async fn update_leagues(&self, phone: &str, leagues: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET leagues = ? WHERE phone = ?")
            .bind(leagues)
            .bind(phone)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }

    pub async fn update_auto_updates(&self, phone: &str, enabled: bool) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET auto_updates = ? WHERE phone = ?")
            .bind(enabled)
            .bind(phone)
            .execute(&self.base.pool)
            .await?;
        Ok(())
    }
}

// ============================================================================
// MatchStateTable
// ============================================================================

impl_table!(
    MatchStateTable,
    MatchStateModel,
    "match_states",
    key,
    "key, phone, event_id, home, away, home_score, away_score, status, updated_at",
    "?, ?, ?, ?, ?, ?, ?, ?, ?",
    [key, phone, event_id, home, away, home_score, away_score, status, updated_at]
);

impl MatchStateTable {
    pub async fn select_by_user_and_event(
        &self,
        phone: &str,
        event_id: &str,
    ) -> Result<Option<MatchStateModel>, DatabaseError> {
        self.select(&MatchStateModel::key_for(phone, event_id)).await
    }

    pub async fn select_all_by_phone(
        &self,
        phone: &str,
    ) -> Result<Vec<MatchStateModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, MatchStateModel>(
            "SELECT * FROM match_states WHERE phone = ? ORDER BY event_id",
        )
        .bind(phone)
        .fetch_all(&self.base.pool)
        .await?)
    }

    /// Deletes every state last refreshed before `cutoff`. Returns the number
    /// of deleted rows.
    pub async fn delete_older_than(&self, cutoff: &DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM match_states WHERE updated_at < ?")
            .bind(cutoff)
            .execute(&self.base.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// MessageLogTable
// ============================================================================

impl_table!(
    MessageLogTable,
    MessageLogModel,
    "message_log",
    msg_id,
    "msg_id, created_at",
    "?, ?",
    [msg_id, created_at]
);

impl MessageLogTable {
    /// Records `msg_id` unless it is already known. Returns `true` when the
    /// id is new.
    pub async fn insert_if_absent(
        &self,
        msg_id: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO message_log (msg_id, created_at) VALUES (?, ?)")
                .bind(msg_id)
                .bind(created_at)
                .execute(&self.base.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_older_than(&self, cutoff: &DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM message_log WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.base.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
