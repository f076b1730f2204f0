//! User registration, league selection and alert preferences.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use sqlx::error::ErrorKind;

use crate::entity::UserModel;
use crate::football::league::League;
use crate::football::league::LeagueSelection;
use crate::football::league::find_league;
use crate::football::league::join_codes;
use crate::repository::Repository;
use crate::repository::error::DatabaseError;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Outcome of a league selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeagueChange {
    Added(&'static League),
    AlreadyFollowing(&'static League),
    Removed(&'static League),
    NotFollowing(&'static League),
    UnknownCode(String),
    Reset,
}

pub struct SubscriptionService {
    db: Arc<Repository>,
}

impl SubscriptionService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Returns the user for `phone`, registering it on first contact.
    ///
    /// # Performance
    /// * DB calls: 1-3
    pub async fn get_or_create_user(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<UserModel, ServiceError> {
        let phone = phone.to_string();
        if let Some(user) = self.db.user.select(&phone).await? {
            return Ok(user);
        }

        let user = UserModel {
            phone: phone.clone(),
            auto_updates: false,
            leagues: String::new(),
            created_at: now,
        };
        match self.db.user.insert(&user).await {
            Ok(_) => Ok(user),
            // Two webhook deliveries for a new user can race on the insert.
            Err(DatabaseError::BackendError(sqlx_err))
                if sqlx_err
                    .as_database_error()
                    .is_some_and(|e| matches!(e.kind(), ErrorKind::UniqueViolation)) =>
            {
                self.db
                    .user
                    .select(&phone)
                    .await?
                    .ok_or_else(|| ServiceError::UnexpectedResult {
                        message: format!("User {phone} vanished after a duplicate insert"),
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The leagues `phone` effectively follows.
    pub async fn selection(&self, phone: &str) -> Result<LeagueSelection, ServiceError> {
        let user = self.db.user.select(&phone.to_string()).await?;
        Ok(user
            .map(|u| LeagueSelection::resolve(&u.leagues))
            .unwrap_or_else(LeagueSelection::default_selection))
    }

    /// Follows a league. Adding to the default selection keeps the defaults
    /// and appends the new code.
    ///
    /// # Performance
    /// * DB calls: 2-4
    pub async fn add_league(
        &self,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<LeagueChange, ServiceError> {
        let Some(league) = find_league(code) else {
            return Ok(LeagueChange::UnknownCode(code.trim().to_string()));
        };
        let user = self.get_or_create_user(phone, now).await?;
        let selection = LeagueSelection::resolve(&user.leagues);
        if selection.contains_code(league.code) {
            return Ok(LeagueChange::AlreadyFollowing(league));
        }

        let mut codes = selection.codes().to_vec();
        codes.push(league.code);
        self.db.user.update_leagues(phone, &join_codes(&codes)).await?;
        Ok(LeagueChange::Added(league))
    }

    /// Unfollows a league. Removing the last explicit league falls back to
    /// the default selection.
    ///
    /// # Performance
    /// * DB calls: 2-4
    pub async fn remove_league(
        &self,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<LeagueChange, ServiceError> {
        let Some(league) = find_league(code) else {
            return Ok(LeagueChange::UnknownCode(code.trim().to_string()));
        };
        let user = self.get_or_create_user(phone, now).await?;
        let selection = LeagueSelection::resolve(&user.leagues);
        if !selection.contains_code(league.code) {
            return Ok(LeagueChange::NotFollowing(league));
        }

        let codes: Vec<&str> = selection
            .codes()
            .iter()
            .copied()
            .filter(|c| *c != league.code)
            .collect();
        self.db.user.update_leagues(phone, &join_codes(&codes)).await?;
        Ok(LeagueChange::Removed(league))
    }

    /// Drops every explicit league, back to the default selection.
    pub async fn reset_leagues(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> Result<LeagueChange, ServiceError> {
        self.get_or_create_user(phone, now).await?;
        self.db.user.update_leagues(phone, "").await?;
        Ok(LeagueChange::Reset)
    }

    /// Turns kickoff/goal/full time pushes on or off.
    pub async fn set_auto_updates(
        &self,
        phone: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.get_or_create_user(phone, now).await?;
        self.db.user.update_auto_updates(phone, enabled).await?;
        Ok(())
    }

    /// Users the match update poller should process.
    ///
    /// # Performance
    /// * DB calls: 1
    pub async fn list_auto_update_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(self.db.user.select_all_with_auto_updates().await?)
    }
}
