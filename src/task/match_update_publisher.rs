//! Background task polling the feed and pushing match updates.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use log::warn;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use crate::event::MatchUpdateEvent;
use crate::event::event_bus::EventBus;
use crate::feed::Feed;
use crate::service::maintenance_service::MaintenanceService;
use crate::service::maintenance_service::SweepReport;
use crate::service::match_tracking_service::MatchTrackingService;
use crate::service::subscription_service::SubscriptionService;

/// What a finished tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    pub users: usize,
    pub events: usize,
    /// Users with at least one event skipped after a storage error.
    pub failed_users: usize,
    pub swept: SweepReport,
    pub notifications: Vec<MatchUpdateEvent>,
}

#[derive(Debug)]
pub enum TickOutcome {
    /// The previous tick was still running.
    Skipped,
    Ran(TickReport),
}

/// Clears the in-flight flag however the tick ends.
struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Task that periodically diffs every alert user's matches and publishes a
/// [`MatchUpdateEvent`] per transition.
pub struct MatchUpdatePublisher {
    subscription: Arc<SubscriptionService>,
    match_tracking: Arc<MatchTrackingService>,
    maintenance: Arc<MaintenanceService>,
    feed: Arc<dyn Feed>,
    event_bus: Arc<EventBus>,
    poll_interval: Duration,
    retention: chrono::Duration,
    running: AtomicBool,
    ticking: AtomicBool,
}

impl MatchUpdatePublisher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subscription: Arc<SubscriptionService>,
        match_tracking: Arc<MatchTrackingService>,
        maintenance: Arc<MaintenanceService>,
        feed: Arc<dyn Feed>,
        event_bus: Arc<EventBus>,
        poll_interval: Duration,
        retention: chrono::Duration,
    ) -> Arc<Self> {
        info!("Initializing MatchUpdatePublisher with poll interval {poll_interval:?}");
        Arc::new(Self {
            subscription,
            match_tracking,
            maintenance,
            feed,
            event_bus,
            poll_interval,
            retention,
            running: AtomicBool::new(false),
            ticking: AtomicBool::new(false),
        })
    }

    /// Starts the polling loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("Starting MatchUpdatePublisher check loop.");
            self.spawn_check_loop();
        }
        Ok(())
    }

    /// Stops the polling loop at its next interval. A tick already running
    /// finishes.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping MatchUpdatePublisher check loop.");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_check_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !self.running.load(Ordering::SeqCst) {
                    info!("Stopping check loop.");
                    break;
                }
                // Overlapping ticks come back as Skipped.
                let this = self.clone();
                tokio::spawn(async move {
                    match this.run_tick().await {
                        Ok(TickOutcome::Skipped) => {
                            warn!("Previous tick still running, skipping this one.")
                        }
                        Ok(TickOutcome::Ran(report)) => debug!(
                            "Tick done: {} users, {} events, {} updates, {} failed users.",
                            report.users,
                            report.events,
                            report.notifications.len(),
                            report.failed_users
                        ),
                        Err(e) => error!("Error checking match updates: {e:?}"),
                    }
                });
            }
        });
    }

    pub async fn run_tick(&self) -> anyhow::Result<TickOutcome> {
        self.run_tick_at(Utc::now()).await
    }

    /// Runs one tick as of `now`, unless another tick is in flight.
    ///
    /// A feed failure aborts the tick before any state is touched.
    pub async fn run_tick_at(&self, now: DateTime<Utc>) -> anyhow::Result<TickOutcome> {
        if self
            .ticking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(TickOutcome::Skipped);
        }
        let _guard = TickGuard(&self.ticking);

        let span = tracing::info_span!("match_tick", at = %now.format("%H:%M:%S"));
        self.tick(now).instrument(span).await.map(TickOutcome::Ran)
    }

    async fn tick(&self, now: DateTime<Utc>) -> anyhow::Result<TickReport> {
        let users = self.subscription.list_auto_update_users().await?;
        if users.is_empty() {
            debug!("No users with alerts enabled.");
            let swept = self.maintenance.sweep_expired(now, self.retention).await?;
            return Ok(TickReport {
                swept,
                ..Default::default()
            });
        }

        let day = now.date_naive();
        let events = self
            .feed
            .fetch_events(day)
            .await
            .with_context(|| format!("Fetching events from {} for {day}", self.feed.info().name))?;
        info!("Checking {} events for {} users.", events.len(), users.len());

        let swept = self.maintenance.sweep_expired(now, self.retention).await?;

        let mut report = TickReport {
            users: users.len(),
            events: events.len(),
            swept,
            ..Default::default()
        };
        for user in &users {
            let tracking = self.match_tracking.track_user(user, &events, now).await;
            if tracking.failed_events > 0 {
                report.failed_users += 1;
                warn!(
                    "Skipped {} events for {} after storage errors.",
                    tracking.failed_events, user.phone
                );
            }
            report.notifications.extend(tracking.updates);
        }

        for update in &report.notifications {
            self.event_bus.publish(update.clone());
        }
        Ok(report)
    }
}
