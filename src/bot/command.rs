use std::convert::Infallible;
use std::str::FromStr;

/// A parsed chat command. Parsing is case-insensitive and ignores extra
/// whitespace; anything unrecognised is [`Command::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu,
    Live,
    Fixtures,
    Results,
    Leagues,
    /// `add <code>`; the code may be empty.
    Add(String),
    Remove(String),
    Reset,
    Alerts(bool),
    DebugLeagues,
    Unknown(String),
}

impl FromStr for Command {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let (head, rest) = match text.split_once(' ') {
            Some((head, rest)) => (head, rest),
            None => (text.as_str(), ""),
        };

        let command = match (head, rest) {
            ("menu" | "help" | "hi" | "hello" | "start", "") => Command::Menu,
            ("live" | "scores", "") => Command::Live,
            ("fixtures" | "today", "") => Command::Fixtures,
            ("results", "") => Command::Results,
            ("leagues", "") | ("my", "leagues") => Command::Leagues,
            ("add" | "follow", code) => Command::Add(code.to_string()),
            ("remove" | "unfollow", code) => Command::Remove(code.to_string()),
            ("reset", "" | "leagues") => Command::Reset,
            ("alerts" | "updates", "on") => Command::Alerts(true),
            ("alerts" | "updates", "off") => Command::Alerts(false),
            ("debug", "leagues") => Command::DebugLeagues,
            _ => Command::Unknown(text.clone()),
        };
        Ok(command)
    }
}
