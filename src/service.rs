//! Business logic services for subscriptions, score queries and match tracking.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::feed::Feed;
use crate::repository::Repository;
use crate::service::inbox_service::InboxService;
use crate::service::maintenance_service::MaintenanceService;
use crate::service::match_tracking_service::MatchTrackingService;
use crate::service::scores_service::ScoresService;
use crate::service::subscription_service::SubscriptionService;

pub mod error;
pub mod inbox_service;
pub mod maintenance_service;
pub mod match_tracking_service;
pub mod scores_service;
pub mod subscription_service;

/// Container for all application services.
pub struct Services {
    pub subscription: Arc<SubscriptionService>,
    pub scores: Arc<ScoresService>,
    pub inbox: Arc<InboxService>,
    pub match_tracking: Arc<MatchTrackingService>,
    pub maintenance: Arc<MaintenanceService>,
    /// Feed shared by the query path and the poller.
    pub feed: Arc<dyn Feed>,
}

impl Services {
    pub fn new(db: Arc<Repository>, feed: Arc<dyn Feed>, tz: Tz) -> Self {
        Self {
            subscription: Arc::new(SubscriptionService::new(db.clone())),
            scores: Arc::new(ScoresService::new(feed.clone(), tz)),
            inbox: Arc::new(InboxService::new(db.clone())),
            match_tracking: Arc::new(MatchTrackingService::new(db.clone())),
            maintenance: Arc::new(MaintenanceService::new(db)),
            feed,
        }
    }
}
