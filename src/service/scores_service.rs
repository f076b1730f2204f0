//! On-demand score queries from the webhook.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;

use crate::feed::Feed;
use crate::feed::MatchEvent;
use crate::football::format::Intent;
use crate::football::format::format_events;
use crate::football::format::format_league_names;
use crate::football::league::LeagueSelection;
use crate::service::error::ServiceError;

/// Answers live/fixtures/results queries. Never touches match state.
pub struct ScoresService {
    feed: Arc<dyn Feed>,
    tz: Tz,
}

impl ScoresService {
    pub fn new(feed: Arc<dyn Feed>, tz: Tz) -> Self {
        Self { feed, tz }
    }

    /// Today's events (UTC day).
    pub async fn today_events(&self) -> Result<Vec<MatchEvent>, ServiceError> {
        Ok(self.feed.fetch_events(Utc::now().date_naive()).await?)
    }

    /// Today's events in `selection`, rendered for `intent`.
    pub async fn query(
        &self,
        intent: Intent,
        selection: &LeagueSelection,
    ) -> Result<String, ServiceError> {
        let events: Vec<MatchEvent> = self
            .today_events()
            .await?
            .into_iter()
            .filter(|e| selection.matches(&e.league))
            .collect();
        Ok(format_events(&events, intent, self.tz))
    }

    /// Every league name in today's feed, unfiltered.
    pub async fn league_names(&self) -> Result<String, ServiceError> {
        Ok(format_league_names(&self.today_events().await?))
    }
}
