//! Per-user match change detection.
//!
//! Each (user, event) pair is either unseen or tracked. An event becomes
//! tracked the first time it is observed live or finished for a user, and
//! every later observation is diffed against the stored row:
//!
//! | prior                    | current                  | push      |
//! |--------------------------|--------------------------|-----------|
//! | unseen                   | live                     | kickoff   |
//! | unseen                   | finished                 | -         |
//! | tracked, not finished    | finished                 | full time |
//! | tracked                  | live, score moved        | goal      |
//! | tracked, not live        | live                     | kickoff   |
//! | tracked, finished        | anything                 | -         |
//!
//! At most one push per event per poll, first matching row wins. The row is
//! rewritten on every observation, pushed or not.
//!
//! "Score moved" needs a complete current score that differs from the
//! stored one. A half-filled score never moves, and neither does a first
//! 0-0 after no score at all.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;

use crate::entity::MatchStateModel;
use crate::entity::UserModel;
use crate::event::MatchUpdateEvent;
use crate::event::MatchUpdateKind;
use crate::feed::MatchEvent;
use crate::football::format::format_notification;
use crate::football::league::LeagueSelection;
use crate::football::status::MatchPhase;
use crate::football::status::classify;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

type Scores = (Option<i32>, Option<i32>);

/// Decides which push, if any, an observation triggers.
///
/// `phase` must be trackable; callers skip scheduled, ignored and unknown
/// events before asking.
pub fn detect_transition(
    prior: Option<&MatchStateModel>,
    event: &MatchEvent,
    phase: MatchPhase,
) -> Option<MatchUpdateKind> {
    let Some(prior) = prior else {
        return (phase == MatchPhase::Live).then_some(MatchUpdateKind::Kickoff);
    };

    let prior_phase = classify(&prior.status, prior.home_score, prior.away_score);
    if prior_phase == MatchPhase::Finished {
        return None;
    }
    if phase == MatchPhase::Finished {
        return Some(MatchUpdateKind::FullTime);
    }
    if phase != MatchPhase::Live {
        return None;
    }
    if score_moved(prior.scores(), event.scores()) {
        return Some(MatchUpdateKind::Goal);
    }
    (prior_phase != MatchPhase::Live).then_some(MatchUpdateKind::Kickoff)
}

/// A goal needs a complete new score that differs from the stored one. A
/// first 0-0 after no score at all is the provider filling the field in.
fn score_moved(prior: Scores, current: Scores) -> bool {
    let (Some(home), Some(away)) = current else {
        return false;
    };
    if prior == current {
        return false;
    }
    let prior_complete = prior.0.is_some() && prior.1.is_some();
    prior_complete || (home, away) != (0, 0)
}

/// The row to store for an observation. Finished is terminal: a later
/// non-finished status from the provider does not overwrite it.
fn next_state(
    phone: &str,
    prior: Option<&MatchStateModel>,
    event: &MatchEvent,
    phase: MatchPhase,
    now: DateTime<Utc>,
) -> MatchStateModel {
    let status = match prior {
        Some(p)
            if phase != MatchPhase::Finished
                && classify(&p.status, p.home_score, p.away_score) == MatchPhase::Finished =>
        {
            p.status.clone()
        }
        _ => event.status.clone(),
    };

    MatchStateModel {
        key: MatchStateModel::key_for(phone, &event.id),
        phone: phone.to_string(),
        event_id: event.id.clone(),
        home: event.home_team.clone(),
        away: event.away_team.clone(),
        home_score: event.home_score,
        away_score: event.away_score,
        status,
        updated_at: now,
    }
}

/// Result of diffing one user's events.
#[derive(Debug, Default)]
pub struct UserTracking {
    pub updates: Vec<MatchUpdateEvent>,
    /// Events skipped because their state could not be read or written.
    pub failed_events: usize,
}

pub struct MatchTrackingService {
    db: Arc<Repository>,
}

impl MatchTrackingService {
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Diffs one user's followed events against stored state, persists the
    /// new observations and returns the pushes to send.
    ///
    /// A storage error skips that event only. Its push is dropped together
    /// with its write, so the next poll sees the old state and detects the
    /// transition again.
    ///
    /// # Performance
    /// * DB calls: 2 per trackable followed event
    pub async fn track_user(
        &self,
        user: &UserModel,
        events: &[MatchEvent],
        now: DateTime<Utc>,
    ) -> UserTracking {
        let selection = LeagueSelection::resolve(&user.leagues);
        let mut tracking = UserTracking::default();

        for event in events.iter().filter(|e| selection.matches(&e.league)) {
            if event.id.trim().is_empty() {
                continue;
            }
            let phase = event.phase();
            if !phase.is_trackable() {
                continue;
            }

            match self.track_event(user, event, phase, now).await {
                Ok(Some(update)) => tracking.updates.push(update),
                Ok(None) => debug!("No change for event {} for {}.", event.id, user.phone),
                Err(e) => {
                    tracking.failed_events += 1;
                    error!(
                        "Error tracking event {} for {}: {e:?}",
                        event.id, user.phone
                    );
                }
            }
        }

        tracking
    }

    async fn track_event(
        &self,
        user: &UserModel,
        event: &MatchEvent,
        phase: MatchPhase,
        now: DateTime<Utc>,
    ) -> Result<Option<MatchUpdateEvent>, ServiceError> {
        let prior = self
            .db
            .match_state
            .select_by_user_and_event(&user.phone, &event.id)
            .await?;
        let kind = detect_transition(prior.as_ref(), event, phase);

        let state = next_state(&user.phone, prior.as_ref(), event, phase, now);
        self.db.match_state.replace(&state).await?;

        Ok(kind.map(|kind| {
            info!(
                "Detected {kind} for event {} ({} vs {}) for {}.",
                event.id, event.home_team, event.away_team, user.phone
            );
            MatchUpdateEvent {
                phone: user.phone.clone(),
                kind,
                event: event.clone(),
                message: format_notification(kind, event),
            }
        }))
    }
}
