//! Upstream match data: the event value object and the feed abstraction.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::feed::error::FeedError;
use crate::football::status::MatchPhase;
use crate::football::status::classify;

pub mod cached_feed;
pub mod error;
pub mod sports_db_feed;

/// One match as reported by the provider for a given day.
///
/// Fixed shape, validated once at the fetch boundary. Missing text fields
/// are empty strings; missing scores are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Provider identifier. May be empty, in which case the event cannot be
    /// tracked between polls.
    pub id: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    /// Free-text status, e.g. "Match Finished", "2H", "".
    pub status: String,
    /// ISO-8601 kickoff timestamp, UTC or with offset.
    pub timestamp: Option<String>,
    /// Provider local kickoff time of day, e.g. "19:45:00".
    pub local_time: Option<String>,
}

impl MatchEvent {
    pub fn phase(&self) -> MatchPhase {
        classify(&self.status, self.home_score, self.away_score)
    }

    pub fn scores(&self) -> (Option<i32>, Option<i32>) {
        (self.home_score, self.away_score)
    }

    /// `"2-1"` when both scores are known.
    pub fn score_text(&self) -> Option<String> {
        match self.scores() {
            (Some(home), Some(away)) => Some(format!("{home}-{away}")),
            _ => None,
        }
    }
}

/// Static description of a feed provider.
#[derive(Clone, Debug)]
pub struct FeedInfo {
    pub name: String,
    pub api_url: String,
}

/// Source of today's soccer events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Feed: Send + Sync {
    /// Fetches every soccer event scheduled on `day` (UTC).
    async fn fetch_events(&self, day: NaiveDate) -> Result<Vec<MatchEvent>, FeedError>;

    fn info(&self) -> &FeedInfo;
}
