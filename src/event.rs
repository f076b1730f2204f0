//! Events dispatched through the [`event_bus::EventBus`].

use std::fmt;

use crate::feed::MatchEvent;

pub mod event_bus;

/// Marker trait for events that can be dispatched through the event bus.
pub trait Event: std::any::Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get the name of the event type.
    fn event_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// A meaningful change in a followed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchUpdateKind {
    Kickoff,
    Goal,
    FullTime,
}

impl fmt::Display for MatchUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchUpdateKind::Kickoff => "kickoff",
            MatchUpdateKind::Goal => "goal",
            MatchUpdateKind::FullTime => "full time",
        };
        f.write_str(s)
    }
}

/// Fired once per detected transition, addressed to a single user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchUpdateEvent {
    pub phone: String,
    pub kind: MatchUpdateKind,
    pub event: MatchEvent,
    /// Rendered push text.
    pub message: String,
}

impl Event for MatchUpdateEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
