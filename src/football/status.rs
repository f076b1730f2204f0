//! Match phase classification from the provider's free-text status.
//!
//! The upstream vocabulary is inconsistent ("Match Finished", "FT", "2H",
//! blank for both fixtures and some live games), so classification is a
//! fixed-precedence keyword heuristic over normalized text:
//!
//! 1. any finished keyword -> [`MatchPhase::Finished`]
//! 2. any live keyword -> [`MatchPhase::Live`]
//! 3. both scores present, no scheduled or ignored keyword -> [`MatchPhase::Live`]
//! 4. empty text or a scheduled keyword -> [`MatchPhase::Scheduled`]
//! 5. an ignored keyword -> [`MatchPhase::Ignored`], anything else [`MatchPhase::Unknown`]
//!
//! Reordering these steps changes outcomes for ambiguous input.

use std::fmt;

use crate::football::contains_phrase;
use crate::football::normalize_text;

pub const FINISHED_KEYWORDS: &[&str] = &[
    "finished",
    "match finished",
    "ft",
    "full time",
    "fulltime",
    "ended",
    "final",
    "aet",
    "after extra time",
    "after penalties",
    "ap",
    "pen",
];

pub const LIVE_KEYWORDS: &[&str] = &[
    "live",
    "in play",
    "inplay",
    "playing",
    "half time",
    "halftime",
    "ht",
    "1st half",
    "2nd half",
    "first half",
    "second half",
    "1h",
    "2h",
    "extra time",
    "et",
    "break time",
    "bt",
    "penalty shootout",
    "penalties",
    "p",
];

pub const SCHEDULED_KEYWORDS: &[&str] = &[
    "not started",
    "ns",
    "scheduled",
    "fixture",
    "tbd",
    "time to be defined",
];

pub const IGNORED_KEYWORDS: &[&str] = &[
    "postponed",
    "pst",
    "cancelled",
    "canceled",
    "canc",
    "abandoned",
    "abd",
    "suspended",
    "susp",
    "interrupted",
    "int",
    "delayed",
    "awarded",
    "awd",
    "walkover",
    "wo",
];

/// Derived phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPhase {
    Scheduled,
    Live,
    Finished,
    /// Postponed, cancelled, abandoned and similar.
    Ignored,
    /// Status text nobody recognises.
    Unknown,
}

impl MatchPhase {
    /// Live and finished matches are tracked for notifications.
    pub fn is_trackable(self) -> bool {
        matches!(self, MatchPhase::Live | MatchPhase::Finished)
    }
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::Scheduled => "scheduled",
            MatchPhase::Live => "live",
            MatchPhase::Finished => "finished",
            MatchPhase::Ignored => "ignored",
            MatchPhase::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

fn has_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| contains_phrase(normalized, kw))
}

/// Classifies a status text, optionally helped by the current score.
pub fn classify(status: &str, home_score: Option<i32>, away_score: Option<i32>) -> MatchPhase {
    let text = normalize_text(status);

    if has_any(&text, FINISHED_KEYWORDS) {
        return MatchPhase::Finished;
    }
    if has_any(&text, LIVE_KEYWORDS) {
        return MatchPhase::Live;
    }

    let scheduled = has_any(&text, SCHEDULED_KEYWORDS);
    let ignored = has_any(&text, IGNORED_KEYWORDS);

    if home_score.is_some() && away_score.is_some() && !scheduled && !ignored {
        return MatchPhase::Live;
    }
    if text.is_empty() || scheduled {
        return MatchPhase::Scheduled;
    }
    if ignored {
        MatchPhase::Ignored
    } else {
        MatchPhase::Unknown
    }
}
