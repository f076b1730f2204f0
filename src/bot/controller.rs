//! Turns one inbound chat message into one reply.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use log::error;
use log::info;

use crate::bot::command::Command;
use crate::football::format::Intent;
use crate::football::format::format_league_list;
use crate::football::format::menu_text;
use crate::football::format::unknown_command_text;
use crate::football::league::DEFAULT_LEAGUE_CODES;
use crate::service::Services;
use crate::service::error::ServiceError;
use crate::service::subscription_service::LeagueChange;

pub struct BotController {
    services: Arc<Services>,
}

impl BotController {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Handles `text` from `phone` and returns the reply. Never fails:
    /// errors become an apology.
    pub async fn handle_message(&self, phone: &str, text: &str, now: DateTime<Utc>) -> String {
        let Ok(command) = text.parse::<Command>();
        info!("Handling {command:?} from {phone}.");

        match self.dispatch(phone, command, now).await {
            Ok(reply) => reply,
            Err(ServiceError::FeedError(e)) => {
                error!("Feed error while answering {phone}: {e}");
                "Couldn't fetch scores right now. Please try again in a minute.".to_string()
            }
            Err(e) => {
                error!("Error while answering {phone}: {e:?}");
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }

    async fn dispatch(
        &self,
        phone: &str,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let subscription = &self.services.subscription;
        subscription.get_or_create_user(phone, now).await?;

        let reply = match command {
            Command::Menu => menu_text(),
            Command::Live => self.query(phone, Intent::Live).await?,
            Command::Fixtures => self.query(phone, Intent::Fixtures).await?,
            Command::Results => self.query(phone, Intent::Results).await?,
            Command::Leagues => format_league_list(&subscription.selection(phone).await?),
            Command::Add(code) if code.is_empty() => {
                "Send *add <code>*, e.g. *add epl*. Send *leagues* for all codes.".to_string()
            }
            Command::Remove(code) if code.is_empty() => {
                "Send *remove <code>*, e.g. *remove epl*.".to_string()
            }
            Command::Add(code) => match subscription.add_league(phone, &code, now).await? {
                LeagueChange::Added(league) => {
                    format!("Added {} ({}).", league.name, league.code)
                }
                LeagueChange::AlreadyFollowing(league) => {
                    format!("You already follow {}.", league.name)
                }
                change => change_text(change),
            },
            Command::Remove(code) => match subscription.remove_league(phone, &code, now).await? {
                LeagueChange::Removed(league) => {
                    if subscription.selection(phone).await?.is_default() {
                        format!(
                            "Removed {}. You are back on the default leagues.",
                            league.name
                        )
                    } else {
                        format!("Removed {}.", league.name)
                    }
                }
                LeagueChange::NotFollowing(league) => {
                    format!("You don't follow {}.", league.name)
                }
                change => change_text(change),
            },
            Command::Reset => change_text(subscription.reset_leagues(phone, now).await?),
            Command::Alerts(enabled) => {
                subscription.set_auto_updates(phone, enabled, now).await?;
                if enabled {
                    "Alerts on. You'll get kickoff, goal and full time updates for your leagues."
                        .to_string()
                } else {
                    "Alerts off.".to_string()
                }
            }
            Command::DebugLeagues => self.services.scores.league_names().await?,
            Command::Unknown(_) => unknown_command_text(),
        };
        Ok(reply)
    }

    async fn query(&self, phone: &str, intent: Intent) -> Result<String, ServiceError> {
        let selection = self.services.subscription.selection(phone).await?;
        self.services.scores.query(intent, &selection).await
    }
}

fn change_text(change: LeagueChange) -> String {
    match change {
        LeagueChange::UnknownCode(code) => {
            format!("Unknown league code '{code}'. Send *leagues* to see all codes.")
        }
        LeagueChange::Reset => format!(
            "Back to the default leagues: {}.",
            DEFAULT_LEAGUE_CODES.join(", ")
        ),
        LeagueChange::Added(league) | LeagueChange::AlreadyFollowing(league) => {
            format!("Following {}.", league.name)
        }
        LeagueChange::Removed(league) | LeagueChange::NotFollowing(league) => {
            format!("Not following {}.", league.name)
        }
    }
}
