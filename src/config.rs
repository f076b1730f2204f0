//! Environment-driven configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::AppError;

/// Toggles for optional background components.
#[derive(Clone, Debug)]
pub struct Features {
    /// Runs the match update poller that pushes kickoff/goal/full time alerts.
    pub auto_updates: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self { auto_updates: true }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub poll_interval: Duration,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
    pub bind_addr: String,
    pub verify_token: String,
    pub whatsapp_access_token: String,
    pub whatsapp_phone_id: String,
    pub graph_api_url: String,
    pub graph_version: String,
    pub sportsdb_api_url: String,
    pub sportsdb_key: String,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub state_retention: chrono::Duration,
    pub display_timezone: Tz,
    pub features: Features,
}

impl Config {
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            db_url: "sqlite://data/liveball.db".to_string(),
            db_path: "data/liveball.db".to_string(),
            logs_path: PathBuf::from("logs"),
            bind_addr: "0.0.0.0:8000".to_string(),
            verify_token: "live_ball".to_string(),
            whatsapp_access_token: String::new(),
            whatsapp_phone_id: String::new(),
            graph_api_url: "https://graph.facebook.com".to_string(),
            graph_version: "v19.0".to_string(),
            sportsdb_api_url: "https://www.thesportsdb.com/api/v1/json".to_string(),
            sportsdb_key: "123".to_string(),
            fetch_timeout: Duration::from_secs(20),
            cache_ttl: Duration::from_secs(60),
            state_retention: chrono::Duration::hours(48),
            display_timezone: chrono_tz::America::New_York,
            features: Features::default(),
        }
    }

    /// Overrides the defaults with values from the process environment.
    pub fn load(&mut self) -> Result<(), AppError> {
        if let Some(secs) = parse_var::<u64>("POLL_INTERVAL")? {
            self.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(v) = var("DB_URL") {
            self.db_url = v;
        }
        if let Some(v) = var("DB_PATH") {
            self.db_path = v;
        }
        if let Some(v) = var("LOGS_PATH") {
            self.logs_path = PathBuf::from(v);
        }
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = var("VERIFY_TOKEN") {
            self.verify_token = v;
        }
        if let Some(v) = var("GRAPH_API_URL") {
            self.graph_api_url = v;
        }
        if let Some(v) = var("GRAPH_VERSION") {
            self.graph_version = v;
        }
        if let Some(v) = var("SPORTSDB_API_URL") {
            self.sportsdb_api_url = v;
        }
        if let Some(v) = var("SPORTSDB_KEY") {
            self.sportsdb_key = v;
        }
        if let Some(secs) = parse_var::<u64>("FETCH_TIMEOUT")? {
            self.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>("CACHE_TTL")? {
            self.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(hours) = parse_var::<i64>("STATE_RETENTION_HOURS")? {
            self.state_retention = chrono::Duration::hours(hours);
        }
        if let Some(v) = var("DISPLAY_TIMEZONE") {
            self.display_timezone = v
                .parse::<Tz>()
                .map_err(|_| AppError::invalid_config("DISPLAY_TIMEZONE", v))?;
        }
        if let Some(enabled) = parse_var::<bool>("FEATURE_AUTO_UPDATES")? {
            self.features.auto_updates = enabled;
        }

        self.whatsapp_access_token = required("WHATSAPP_ACCESS_TOKEN")?;
        self.whatsapp_phone_id = required("WHATSAPP_PHONE_ID")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String, AppError> {
    var(key).ok_or_else(|| AppError::missing_config(key))
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::invalid_config(key, raw)),
        None => Ok(None),
    }
}
