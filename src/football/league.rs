//! League codes and provider league-name matching.

use crate::football::normalize_text;

/// A user-facing competition code and the provider phrases that identify it.
#[derive(Debug, PartialEq, Eq)]
pub struct League {
    pub code: &'static str,
    pub name: &'static str,
    /// Any of these, normalized, appearing in the normalized provider league
    /// name is a match. Containment, not equality: sponsors and seasons add
    /// suffixes ("LaLiga Santander", "Liga Portugal Betclic").
    pub keywords: &'static [&'static str],
    /// Phrases that veto a keyword hit, e.g. second divisions sharing the
    /// top flight's name.
    pub excludes: &'static [&'static str],
}

impl League {
    /// Whether a provider league name belongs to this league.
    pub fn matches(&self, league_name: &str) -> bool {
        self.matches_normalized(&normalize_text(league_name))
    }

    fn matches_normalized(&self, normalized: &str) -> bool {
        if normalized.is_empty() {
            return false;
        }
        let hit = self
            .keywords
            .iter()
            .any(|kw| normalized.contains(normalize_text(kw).as_str()));
        hit && !self
            .excludes
            .iter()
            .any(|ex| normalized.contains(normalize_text(ex).as_str()))
    }
}

pub const LEAGUES: &[League] = &[
    League {
        code: "epl",
        name: "Premier League",
        keywords: &["premier league", "english premier league"],
        excludes: &[
            "scottish",
            "russian",
            "egyptian",
            "ukrainian",
            "welsh",
            "northern irish",
            "nifl",
            "kazakhstan",
            "armenian",
            "bahraini",
            "ghana",
            "kenyan",
            "lebanese",
            "maltese",
            "premier league 2",
            "premier league cup",
            "women",
        ],
    },
    League {
        code: "laliga",
        name: "La Liga",
        keywords: &[
            "laliga",
            "la liga",
            "laliga santander",
            "primera division",
            "spain primera division",
            "spanish primera division",
        ],
        excludes: &["laliga 2", "la liga 2", "hypermotion", "smartbank", "women", "femenina"],
    },
    League {
        code: "seriea",
        name: "Serie A",
        keywords: &["serie a", "italian serie a"],
        excludes: &["brazil", "ecuador", "women", "femminile"],
    },
    League {
        code: "bundesliga",
        name: "Bundesliga",
        keywords: &["bundesliga", "german bundesliga"],
        excludes: &["2 bundesliga", "austrian", "women", "frauen"],
    },
    League {
        code: "ligue1",
        name: "Ligue 1",
        keywords: &["ligue 1", "french ligue 1"],
        excludes: &["women", "feminine", "arkema", "algerian", "tunisian", "senegal"],
    },
    League {
        code: "champ",
        name: "Championship",
        keywords: &["championship", "efl championship", "english league championship"],
        excludes: &["scottish", "women", "european", "world"],
    },
    League {
        code: "laliga2",
        name: "La Liga 2",
        keywords: &["laliga 2", "la liga 2", "segunda division", "laliga hypermotion"],
        excludes: &["women", "rfef"],
    },
    League {
        code: "serieb",
        name: "Serie B",
        keywords: &["serie b", "italian serie b"],
        excludes: &["brazil", "ecuador", "women"],
    },
    League {
        code: "bundesliga2",
        name: "2. Bundesliga",
        keywords: &["2 bundesliga", "german 2 bundesliga"],
        excludes: &["austrian", "women", "frauen"],
    },
    League {
        code: "ligue2",
        name: "Ligue 2",
        keywords: &["ligue 2", "french ligue 2"],
        excludes: &["algerian", "tunisian"],
    },
    League {
        code: "ucl",
        name: "UEFA Champions League",
        keywords: &["champions league"],
        excludes: &[
            "afc",
            "caf",
            "concacaf",
            "women",
            "youth",
            "asian",
            "african",
            "arab",
        ],
    },
    League {
        code: "uel",
        name: "UEFA Europa League",
        keywords: &["europa league"],
        excludes: &["conference", "women"],
    },
    League {
        code: "uecl",
        name: "UEFA Conference League",
        keywords: &["conference league", "europa conference league"],
        excludes: "women",
    },
    League {
        code: "turkey",
        name: "Super Lig",
        keywords: &["super lig", "turkish super lig"],
        excludes: "women",
    },
    League {
        code: "portugal",
        name: "Liga Portugal",
        keywords: &[
            "liga portugal",
            "liga portugal betclic",
            "primeira liga",
            "portuguese primeira liga",
        ],
        excludes: &["liga portugal 2", "women"],
    },
    League {
        code: "netherlands",
        name: "Eredivisie",
        keywords: &["eredivisie", "dutch eredivisie"],
        excludes: &["women", "vrouwen"],
    },
    League {
        code: "switzerland",
        name: "Swiss Super League",
        keywords: &["swiss super league"],
        excludes: "women",
    },
    League {
        code: "scotland",
        name: "Scottish Premiership",
        keywords: &["scottish premiership", "scottish premier league"],
        excludes: "women",
    },
    League {
        code: "austria",
        name: "Austrian Bundesliga",
        keywords: &["austrian bundesliga"],
        excludes: &["women", "frauen"],
    },
    League {
        code: "belgium",
        name: "Jupiler Pro League",
        keywords: &["jupiler pro league", "belgian pro league", "belgian first division a"],
        excludes: "women",
    },
    League {
        code: "denmark",
        name: "Danish Superliga",
        keywords: &["danish superliga"],
        excludes: "women",
    },
];

/// Codes followed when a user has not picked any. Second divisions and the
/// Eredivisie are opt-in.
pub const DEFAULT_LEAGUE_CODES: &[&str] = &[
    "epl",
    "laliga",
    "seriea",
    "bundesliga",
    "ligue1",
    "champ",
    "ucl",
    "uel",
    "uecl",
    "turkey",
    "portugal",
    "switzerland",
    "scotland",
    "austria",
    "belgium",
    "denmark",
];

/// Looks up a league by code, case-insensitively.
pub fn find_league(code: &str) -> Option<&'static League> {
    let code = code.trim().to_lowercase();
    LEAGUES.iter().find(|l| l.code == code)
}

/// All league codes a provider league name belongs to.
pub fn league_codes_for(league_name: &str) -> Vec<&'static str> {
    let normalized = normalize_text(league_name);
    LEAGUES
        .iter()
        .filter(|l| l.matches_normalized(&normalized))
        .map(|l| l.code)
        .collect()
}

/// Known codes from a stored comma-separated string, in stored order and
/// without duplicates. Unknown codes are dropped.
pub fn parse_codes(stored: &str) -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = Vec::new();
    for part in stored.split(',') {
        if let Some(league) = find_league(part)
            && !codes.contains(&league.code)
        {
            codes.push(league.code);
        }
    }
    codes
}

/// Inverse of [`parse_codes`].
pub fn join_codes(codes: &[&str]) -> String {
    codes.join(",")
}

/// The leagues a user effectively follows.
///
/// Resolved from the stored string on every read by both the command
/// handler and the update poller, so both always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSelection {
    codes: Vec<&'static str>,
    is_default: bool,
}

impl LeagueSelection {
    pub fn resolve(stored: &str) -> Self {
        let codes = parse_codes(stored);
        if codes.is_empty() {
            Self::default_selection()
        } else {
            Self {
                codes,
                is_default: false,
            }
        }
    }

    pub fn default_selection() -> Self {
        Self {
            codes: DEFAULT_LEAGUE_CODES.to_vec(),
            is_default: true,
        }
    }

    pub fn codes(&self) -> &[&'static str] {
        &self.codes
    }

    /// Whether the selection fell back to [`DEFAULT_LEAGUE_CODES`].
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c.eq_ignore_ascii_case(code.trim()))
    }

    /// Whether a provider league name belongs to any selected league.
    pub fn matches(&self, league_name: &str) -> bool {
        let normalized = normalize_text(league_name);
        self.codes
            .iter()
            .filter_map(|code| find_league(code))
            .any(|league| league.matches_normalized(&normalized))
    }
}
