//! Plain-text rendering of match lists, menus and push notifications.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Utc;
use chrono_tz::Tz;

use crate::event::MatchUpdateKind;
use crate::feed::MatchEvent;
use crate::football::league::LEAGUES;
use crate::football::league::LeagueSelection;
use crate::football::status::MatchPhase;

const BULLET: &str = "• ";

/// What a user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Live,
    Fixtures,
    Results,
}

impl Intent {
    /// The phase an event must be in to show up for this intent.
    pub fn phase(self) -> MatchPhase {
        match self {
            Intent::Live => MatchPhase::Live,
            Intent::Fixtures => MatchPhase::Scheduled,
            Intent::Results => MatchPhase::Finished,
        }
    }

    fn header(self) -> &'static str {
        match self {
            Intent::Live => "LIVE",
            Intent::Fixtures => "TODAY",
            Intent::Results => "RESULTS",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            Intent::Live => "No live matches right now.",
            Intent::Fixtures => "No fixtures found for today.",
            Intent::Results => "No finished results yet today.",
        }
    }
}

/// Renders the events matching `intent`, grouped by league name.
///
/// Events are expected to be league-filtered already. Leagues are sorted
/// lexicographically and events keep their input order inside a league.
pub fn format_events(events: &[MatchEvent], intent: Intent, tz: Tz) -> String {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.phase() == intent.phase()) {
        let line = match intent {
            Intent::Live => live_line(event),
            Intent::Results => result_line(event),
            Intent::Fixtures => fixture_line(event, tz),
        };
        grouped.entry(event.league.as_str()).or_default().push(line);
    }

    if grouped.is_empty() {
        return intent.empty_message().to_string();
    }

    let mut out = vec![intent.header().to_string(), String::new()];
    for (league, lines) in grouped {
        out.push(if league.is_empty() { "Other" } else { league }.to_string());
        out.extend(lines.into_iter().map(|l| format!("{BULLET}{l}")));
        out.push(String::new());
    }
    out.join("\n").trim().to_string()
}

/// `Home 2-1 Away`, or `Home vs Away` without a full score.
fn scoreline(event: &MatchEvent) -> String {
    match event.score_text() {
        Some(score) => format!("{} {score} {}", event.home_team, event.away_team),
        None => format!("{} vs {}", event.home_team, event.away_team),
    }
}

fn live_line(event: &MatchEvent) -> String {
    let status = event.status.trim();
    if status.is_empty() {
        scoreline(event)
    } else {
        format!("{} ({status})", scoreline(event))
    }
}

fn result_line(event: &MatchEvent) -> String {
    scoreline(event)
}

fn fixture_line(event: &MatchEvent, tz: Tz) -> String {
    format!(
        "{}: {} vs {}",
        format_kickoff_time(event, tz),
        event.home_team,
        event.away_team
    )
}

/// Kickoff time as a 12-hour clock in `tz`, e.g. `7:30 PM EDT`.
///
/// Falls back to the provider's local time of day, then to `TBD`.
pub fn format_kickoff_time(event: &MatchEvent, tz: Tz) -> String {
    if let Some(kickoff) = event.timestamp.as_deref().and_then(parse_timestamp) {
        return kickoff.with_timezone(&tz).format("%-I:%M %p %Z").to_string();
    }

    match event.local_time.as_deref().map(str::trim) {
        Some(time) if !time.is_empty() => match NaiveTime::parse_from_str(time, "%H:%M:%S") {
            Ok(t) => t.format("%-I:%M %p").to_string(),
            Err(_) => time.to_string(),
        },
        _ => "TBD".to_string(),
    }
}

/// Parses provider timestamps. `Z` and a missing offset both mean UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let with_offset = raw.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&with_offset) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn menu_text() -> String {
    [
        "⚽ LiveBall",
        "",
        "Scores",
        "• live - matches in play",
        "• fixtures - today's kickoffs",
        "• results - finished today",
        "",
        "Leagues",
        "• leagues - list codes",
        "• add <code> - follow a league",
        "• remove <code> - unfollow a league",
        "• reset - back to the default leagues",
        "",
        "Alerts",
        "• alerts on - kickoff, goal and full time pushes",
        "• alerts off",
    ]
    .join("\n")
}

pub fn unknown_command_text() -> String {
    "Sorry, I didn't get that. Send *menu* to see what I can do.".to_string()
}

/// Every known league, with the user's selection marked.
pub fn format_league_list(selection: &LeagueSelection) -> String {
    let mut out = vec!["LEAGUES".to_string(), String::new()];
    for league in LEAGUES {
        let mark = if selection.contains_code(league.code) {
            "✅"
        } else {
            "▫️"
        };
        out.push(format!("{mark} {} - {}", league.code, league.name));
    }
    out.push(String::new());
    if selection.is_default() {
        out.push("You are following the default leagues.".to_string());
    }
    out.push("Send *add <code>* or *remove <code>* to change.".to_string());
    out.join("\n")
}

/// Distinct provider league names, for troubleshooting league codes.
pub fn format_league_names(events: &[MatchEvent]) -> String {
    let names: BTreeSet<&str> = events
        .iter()
        .map(|e| e.league.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut out = vec!["LEAGUES FROM API".to_string(), String::new()];
    out.extend(names.into_iter().map(|n| format!("{BULLET}{n}")));
    out.join("\n")
}

/// Push text for a detected match transition.
pub fn format_notification(kind: MatchUpdateKind, event: &MatchEvent) -> String {
    let headline = match kind {
        MatchUpdateKind::Kickoff => format!("🟢 KICKOFF: {} vs {}", event.home_team, event.away_team),
        MatchUpdateKind::Goal => format!("⚽ GOAL! {}", scoreline(event)),
        MatchUpdateKind::FullTime => format!("🏁 FULL TIME: {}", scoreline(event)),
    };
    if event.league.is_empty() {
        headline
    } else {
        format!("{headline}\n{}", event.league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(league: &str, home: &str, away: &str, status: &str, score: Option<(i32, i32)>) -> MatchEvent {
        MatchEvent {
            id: format!("{home}-{away}"),
            league: league.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: score.map(|s| s.0),
            away_score: score.map(|s| s.1),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_live_grouped_and_sorted() {
        let events = vec![
            event("Spanish La Liga", "Barcelona", "Sevilla", "2H", Some((1, 0))),
            event("English Premier League", "Arsenal", "Chelsea", "1H", Some((2, 1))),
            event("English Premier League", "Leeds", "Burnley", "", None),
        ];
        let text = format_events(&events, Intent::Live, chrono_tz::UTC);
        assert_eq!(
            text,
            "LIVE\n\nEnglish Premier League\n• Arsenal 2-1 Chelsea (1H)\n\nSpanish La Liga\n• Barcelona 1-0 Sevilla (2H)"
        );
    }

    #[test]
    fn test_results_and_empty_messages() {
        let events = vec![event("Italian Serie A", "Roma", "Lazio", "Match Finished", Some((0, 0)))];
        assert_eq!(
            format_events(&events, Intent::Results, chrono_tz::UTC),
            "RESULTS\n\nItalian Serie A\n• Roma 0-0 Lazio"
        );
        assert_eq!(format_events(&events, Intent::Live, chrono_tz::UTC), "No live matches right now.");
        assert_eq!(format_events(&[], Intent::Fixtures, chrono_tz::UTC), "No fixtures found for today.");
        assert_eq!(format_events(&[], Intent::Results, chrono_tz::UTC), "No finished results yet today.");
    }

    #[test]
    fn test_scheduled_fixture_only_in_fixtures() {
        let fixture = MatchEvent {
            id: "1".to_string(),
            league: "English Premier League".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            status: String::new(),
            timestamp: Some("2026-10-18T19:30:00Z".to_string()),
            ..Default::default()
        };
        let events = vec![fixture];
        let tz = chrono_tz::America::New_York;

        assert_eq!(
            format_events(&events, Intent::Fixtures, tz),
            "TODAY\n\nEnglish Premier League\n• 3:30 PM EDT: Arsenal vs Chelsea"
        );
        assert_eq!(format_events(&events, Intent::Live, tz), "No live matches right now.");
        assert_eq!(format_events(&events, Intent::Results, tz), "No finished results yet today.");
    }

    #[test]
    fn test_kickoff_time_parsing() {
        let tz = chrono_tz::America::New_York;
        let mut e = MatchEvent {
            timestamp: Some("2026-10-18T14:00:00".to_string()),
            ..Default::default()
        };
        assert_eq!(format_kickoff_time(&e, tz), "10:00 AM EDT");

        e.timestamp = Some("2026-12-01T20:00:00+01:00".to_string());
        assert_eq!(format_kickoff_time(&e, tz), "2:00 PM EST");

        e.timestamp = Some("garbage".to_string());
        e.local_time = Some("19:45:00".to_string());
        assert_eq!(format_kickoff_time(&e, tz), "7:45 PM");

        e.local_time = Some("evening".to_string());
        assert_eq!(format_kickoff_time(&e, tz), "evening");

        e.timestamp = None;
        e.local_time = None;
        assert_eq!(format_kickoff_time(&e, tz), "TBD");
    }

    #[test]
    fn test_league_list_marks_selection() {
        let text = format_league_list(&LeagueSelection::resolve("epl"));
        assert!(text.contains("✅ epl - Premier League"));
        assert!(text.contains("▫️ ucl - UEFA Champions League"));
        assert!(!text.contains("default leagues"));

        let text = format_league_list(&LeagueSelection::resolve(""));
        assert!(text.contains("✅ ucl"));
        assert!(text.contains("default leagues"));
    }

    #[test]
    fn test_league_names_are_distinct_and_sorted() {
        let events = vec![
            event("B League", "a", "b", "", None),
            event("A League", "c", "d", "", None),
            event("B League", "e", "f", "", None),
            event("", "g", "h", "", None),
        ];
        assert_eq!(format_league_names(&events), "LEAGUES FROM API\n\n• A League\n• B League");
    }

    #[test]
    fn test_notifications() {
        let e = event("English Premier League", "Arsenal", "Chelsea", "2H", Some((2, 1)));
        assert_eq!(
            format_notification(MatchUpdateKind::Goal, &e),
            "⚽ GOAL! Arsenal 2-1 Chelsea\nEnglish Premier League"
        );
        assert!(format_notification(MatchUpdateKind::Kickoff, &e).starts_with("🟢 KICKOFF: Arsenal vs Chelsea"));
        assert!(format_notification(MatchUpdateKind::FullTime, &e).starts_with("🏁 FULL TIME: Arsenal 2-1 Chelsea"));
    }
}
