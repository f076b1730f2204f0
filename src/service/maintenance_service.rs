//! Retention sweeps for the durable stores.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use log::info;

use crate::repository::Repository;
use crate::service::error::ServiceError;

/// Rows removed by one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub match_states: u64,
    pub message_log: u64,
}

/// Service for administrative and maintenance tasks.
pub struct MaintenanceService {
    db: Arc<Repository>,
}

impl MaintenanceService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Deletes match states and processed message ids older than
    /// `retention`, whether or not their match has ended.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn sweep_expired(
        &self,
        now: DateTime<Utc>,
        retention: Duration,
    ) -> Result<SweepReport, ServiceError> {
        let cutoff = now - retention;
        let report = SweepReport {
            match_states: self.db.match_state.delete_older_than(&cutoff).await?,
            message_log: self.db.message_log.delete_older_than(&cutoff).await?,
        };
        if report.match_states > 0 || report.message_log > 0 {
            info!(
                "Swept {} match states and {} message ids older than {cutoff}.",
                report.match_states, report.message_log
            );
        }
        Ok(report)
    }
}
