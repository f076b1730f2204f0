use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use liveball_bot::entity::UserModel;
use liveball_bot::feed::Feed;
use liveball_bot::feed::FeedInfo;
use liveball_bot::feed::MatchEvent;
use liveball_bot::feed::error::FeedError;
use liveball_bot::messenger::Messenger;
use liveball_bot::messenger::error::MessengerError;
use liveball_bot::repository::Repository;
use liveball_bot::repository::table::Table;
use uuid::Uuid;

pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("liveball-bot-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

/// Makes every match state write for `event_id` fail until
/// [`restore_state_writes`] runs.
#[allow(dead_code)]
pub async fn fail_state_writes_for(db: &Repository, event_id: &str) {
    let sql = format!(
        "CREATE TRIGGER fail_state_write BEFORE INSERT ON match_states \
         WHEN NEW.event_id = '{event_id}' \
         BEGIN SELECT RAISE(ABORT, 'state write rejected'); END"
    );
    sqlx::query(&sql)
        .execute(db.pool())
        .await
        .expect("Failed to create trigger");
}

#[allow(dead_code)]
pub async fn restore_state_writes(db: &Repository) {
    sqlx::query("DROP TRIGGER IF EXISTS fail_state_write")
        .execute(db.pool())
        .await
        .expect("Failed to drop trigger");
}

#[allow(dead_code)]
pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub async fn create_user(db: &Repository, phone: &str, auto_updates: bool, leagues: &str) -> UserModel {
    let user = UserModel {
        phone: phone.to_string(),
        auto_updates,
        leagues: leagues.to_string(),
        created_at: Utc::now(),
    };
    db.user.insert(&user).await.expect("Failed to insert user");
    user
}

#[allow(dead_code)]
pub fn match_event(
    id: &str,
    league: &str,
    status: &str,
    scores: (Option<i32>, Option<i32>),
) -> MatchEvent {
    MatchEvent {
        id: id.to_string(),
        league: league.to_string(),
        home_team: "Arsenal".to_string(),
        away_team: "Chelsea".to_string(),
        home_score: scores.0,
        away_score: scores.1,
        status: status.to_string(),
        timestamp: None,
        local_time: None,
    }
}

// MOCK FEED

#[derive(Default)]
pub struct MockFeedState {
    pub events: Vec<MatchEvent>,
    pub fail: bool,
}

#[allow(dead_code)]
pub struct MockFeed {
    pub info: FeedInfo,
    pub state: Mutex<MockFeedState>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockFeed {
    pub fn new() -> Self {
        Self {
            info: FeedInfo {
                name: "MockFeed".to_string(),
                api_url: "http://localhost".to_string(),
            },
            state: Mutex::new(MockFeedState::default()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_events(&self, events: Vec<MatchEvent>) {
        let mut state = self.state.lock().unwrap();
        state.events = events;
        state.fail = false;
    }

    pub fn set_failing(&self) {
        self.state.lock().unwrap().fail = true;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Feed for MockFeed {
    async fn fetch_events(&self, _day: NaiveDate) -> Result<Vec<MatchEvent>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail {
            return Err(FeedError::Timeout { secs: 20 });
        }
        Ok(state.events.clone())
    }

    fn info(&self) -> &FeedInfo {
        &self.info
    }
}

// RECORDING MESSENGER

#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), MessengerError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
