use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// A WhatsApp user talking to the bot.
///
/// Created on the first inbound message from a phone number. The `leagues`
/// column stores the explicitly followed league codes as a comma-separated
/// list; an empty value means the default selection. Always resolve it
/// through [`crate::football::league::LeagueSelection::resolve`].
#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserModel {
    /// WhatsApp id in international format without `+`, e.g. `15551234567`.
    pub phone: String,
    /// Whether the user receives kickoff/goal/full time pushes.
    pub auto_updates: bool,
    /// Comma-separated league codes, e.g. `"epl,ucl"`.
    pub leagues: String,
    pub created_at: DateTime<Utc>,
}

impl Default for UserModel {
    fn default() -> Self {
        Self {
            phone: String::new(),
            auto_updates: false,
            leagues: String::new(),
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// Last observed state of a match, per user.
///
/// One row per (phone, event_id) pair. A row is created the first time a
/// match is seen live or finished for a user and refreshed on every poll
/// while the match keeps showing up. Rows older than the retention window
/// are swept regardless of match completion.
#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MatchStateModel {
    /// `"{phone}:{event_id}"`, see [`MatchStateModel::key_for`].
    pub key: String,
    pub phone: String,
    pub event_id: String,
    pub home: String,
    pub away: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    /// Raw provider status text as last seen.
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl MatchStateModel {
    pub fn key_for(phone: &str, event_id: &str) -> String {
        format!("{phone}:{event_id}")
    }

    pub fn scores(&self) -> (Option<i32>, Option<i32>) {
        (self.home_score, self.away_score)
    }
}

impl Default for MatchStateModel {
    fn default() -> Self {
        Self {
            key: String::new(),
            phone: String::new(),
            event_id: String::new(),
            home: String::new(),
            away: String::new(),
            home_score: None,
            away_score: None,
            status: String::new(),
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// An inbound webhook message that has already been answered.
///
/// The messaging platform retries deliveries it considers unacknowledged;
/// recording the message id lets the webhook drop those retries.
#[derive(FromRow, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageLogModel {
    pub msg_id: String,
    pub created_at: DateTime<Utc>,
}
