//! TheSportsDB v1 daily events feed.

use std::num::NonZeroU32;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use serde::Deserialize;
use serde_json::Value;
use wreq::Client;
use wreq::header::HeaderMap;
use wreq::header::HeaderValue;
use wreq::header::USER_AGENT;

use crate::feed::Feed;
use crate::feed::FeedInfo;
use crate::feed::MatchEvent;
use crate::feed::error::FeedError;

const REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(20).unwrap();
const RATELIMIT_LOG_AFTER: Duration = Duration::from_millis(100);

/// Raw event record as returned by `eventsday.php`.
///
/// Ids and scores arrive as numbers, numeric strings, empty strings or
/// `null` depending on the endpoint revision, hence the loose `Value`s.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SportsDbEvent {
    #[serde(rename = "idEvent")]
    id_event: Option<Value>,
    #[serde(rename = "strLeague")]
    str_league: Option<String>,
    #[serde(rename = "strHomeTeam")]
    str_home_team: Option<String>,
    #[serde(rename = "strAwayTeam")]
    str_away_team: Option<String>,
    #[serde(rename = "intHomeScore")]
    int_home_score: Option<Value>,
    #[serde(rename = "intAwayScore")]
    int_away_score: Option<Value>,
    #[serde(rename = "strStatus")]
    str_status: Option<String>,
    #[serde(rename = "strTimestamp")]
    str_timestamp: Option<String>,
    #[serde(rename = "strTime")]
    str_time: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EventsDayResponse {
    #[serde(default)]
    events: Option<Vec<SportsDbEvent>>,
}

impl From<SportsDbEvent> for MatchEvent {
    fn from(raw: SportsDbEvent) -> Self {
        MatchEvent {
            id: raw.id_event.as_ref().map(value_to_string).unwrap_or_default(),
            league: clean(raw.str_league).unwrap_or_default(),
            home_team: clean(raw.str_home_team).unwrap_or_default(),
            away_team: clean(raw.str_away_team).unwrap_or_default(),
            home_score: raw.int_home_score.as_ref().and_then(value_to_score),
            away_score: raw.int_away_score.as_ref().and_then(value_to_score),
            status: clean(raw.str_status).unwrap_or_default(),
            timestamp: clean(raw.str_timestamp),
            local_time: clean(raw.str_time),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn value_to_score(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Parses an `eventsday.php` body into events. A `null` event list means
/// no matches that day.
pub fn parse_events_body(body: &str) -> Result<Vec<MatchEvent>, FeedError> {
    let resp: EventsDayResponse = serde_json::from_str(body)?;
    Ok(resp
        .events
        .unwrap_or_default()
        .into_iter()
        .map(MatchEvent::from)
        .collect())
}

/// TheSportsDB feed implementation.
pub struct SportsDbFeed {
    pub info: FeedInfo,
    api_key: String,
    timeout: Duration,
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
}

impl SportsDbFeed {
    /// Creates a new feed client. The free tier allows 30 requests per
    /// minute, the limiter keeps well under that.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("liveball-bot/0.1"));
        let client = Client::builder().default_headers(headers).build()?;

        let info = FeedInfo {
            name: "TheSportsDB".to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        };

        let limiter = RateLimiter::direct(Quota::per_minute(REQUESTS_PER_MINUTE));

        Ok(Self {
            info,
            api_key: api_key.into(),
            timeout,
            client,
            limiter,
        })
    }

    async fn send(&self, request: wreq::RequestBuilder) -> Result<wreq::Response, FeedError> {
        let started = Instant::now();
        self.limiter.until_ready().await;
        let waited = started.elapsed();
        if waited >= RATELIMIT_LOG_AFTER {
            info!("Feed {} was ratelimited for {waited:?}.", self.info.name);
        }

        let req = request.build()?;
        debug!("Making request to: {}", req.url());
        match tokio::time::timeout(self.timeout, self.client.execute(req)).await {
            Ok(resp) => Ok(resp?),
            Err(_) => Err(FeedError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl Feed for SportsDbFeed {
    async fn fetch_events(&self, day: NaiveDate) -> Result<Vec<MatchEvent>, FeedError> {
        let day = day.format("%Y-%m-%d").to_string();
        debug!("Fetching events from {} for {day}", self.info.name);

        let request = self
            .client
            .get(format!("{}/{}/eventsday.php", self.info.api_url, self.api_key))
            .query(&[("d", day.as_str()), ("s", "Soccer")]);

        let response = self.send(request).await?;
        let status = response.status();
        let body = match tokio::time::timeout(self.timeout, response.text()).await {
            Ok(body) => body?,
            Err(_) => {
                return Err(FeedError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !status.is_success() {
            return Err(FeedError::BadStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let events = parse_events_body(&body)?;
        debug!("Fetched {} events for {day}", events.len());
        Ok(events)
    }

    fn info(&self) -> &FeedInfo {
        &self.info
    }
}
