//! Inbound message de-duplication.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::repository::Repository;
use crate::service::error::ServiceError;

/// Remembers answered webhook message ids so platform retries get no
/// second reply.
pub struct InboxService {
    db: Arc<Repository>,
}

impl InboxService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Records `msg_id`. Returns `false` if it was already recorded.
    ///
    /// # Performance
    /// * DB calls: 1
    pub async fn first_delivery(
        &self,
        msg_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        Ok(self.db.message_log.insert_if_absent(msg_id, &now).await?)
    }
}
