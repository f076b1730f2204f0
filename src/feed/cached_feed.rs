//! Short-lived cache of successful feed responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;

use crate::feed::Feed;
use crate::feed::FeedInfo;
use crate::feed::MatchEvent;
use crate::feed::error::FeedError;

struct CacheEntry {
    fetched_at: Instant,
    events: Arc<Vec<MatchEvent>>,
}

/// Wraps a [`Feed`] and reuses its last good response per day for `ttl`.
///
/// Only successful responses are stored, and a failed fetch is returned as
/// an error even when an expired entry exists, so callers that must fail
/// closed never see stale data.
pub struct CachedFeed {
    inner: Arc<dyn Feed>,
    ttl: Duration,
    entries: Mutex<HashMap<NaiveDate, CacheEntry>>,
}

impl CachedFeed {
    pub fn new(inner: Arc<dyn Feed>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, day: NaiveDate) -> Option<Arc<Vec<MatchEvent>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&day)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.events.clone())
    }

    fn store(&self, day: NaiveDate, events: Arc<Vec<MatchEvent>>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Only today and maybe yesterday are ever asked for; keep the map tiny.
        entries.retain(|_, entry| entry.fetched_at.elapsed() < self.ttl);
        entries.insert(
            day,
            CacheEntry {
                fetched_at: Instant::now(),
                events,
            },
        );
    }
}

#[async_trait]
impl Feed for CachedFeed {
    async fn fetch_events(&self, day: NaiveDate) -> Result<Vec<MatchEvent>, FeedError> {
        if let Some(events) = self.lookup(day) {
            debug!("Serving {} events for {day} from cache", events.len());
            return Ok(events.as_ref().clone());
        }

        let events = Arc::new(self.inner.fetch_events(day).await?);
        self.store(day, events.clone());
        Ok(events.as_ref().clone())
    }

    fn info(&self) -> &FeedInfo {
        self.inner.info()
    }
}
