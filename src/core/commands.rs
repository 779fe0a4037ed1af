use crate::{
    core::{
        models::{EventId, UserId},
        pagination::PageRequest,
    },
    error::{BoardError, BoardResult},
};

use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Iterator;
use uuid::Uuid;

pub const COMMANDS: [&str; 8] = [
    "!help",
    "!event",
    "!events",
    "!profile",
    "!score",
    "!leaderboard",
    "!stats",
    "!clear",
];
// All whitespace separated words, with optional "!" prefix
static REGEX_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\S+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    CreateEvent(String),
    ListEvents(PageRequest),
    CreateProfile(String),
    SubmitScore(EventId, UserId, i64),
    ShowLeaderboard(EventId, PageRequest),
    CacheStats,
    ClearCaches,
}

/// Paging bounds applied to `[page] [limit]` arguments.
#[derive(Debug, Clone, Copy)]
pub struct PagingBounds {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Command {
    pub fn is_command(input: &str) -> bool {
        REGEX_WORDS
            .find_iter(input)
            .map(|mat| mat.as_str())
            .next()
            .map(|start_with| COMMANDS.contains(&start_with))
            .unwrap_or_default()
    }

    pub fn parse(input: &str, bounds: PagingBounds) -> BoardResult<Command> {
        let mut words = REGEX_WORDS.find_iter(input).map(|mat| mat.as_str());
        let start_with = words.next().unwrap_or_default();

        match start_with {
            cmd if cmd == COMMANDS[0] => Ok(Command::Help),
            cmd if cmd == COMMANDS[1] => {
                // !event <name>
                let name = rest_as_name(words, "!event <name>")?;
                Ok(Command::CreateEvent(name))
            }
            cmd if cmd == COMMANDS[2] => {
                // !events [page] [limit]
                Ok(Command::ListEvents(page_request(words, bounds)?))
            }
            cmd if cmd == COMMANDS[3] => {
                // !profile <display name>
                let name = rest_as_name(words, "!profile <display name>")?;
                Ok(Command::CreateProfile(name))
            }
            cmd if cmd == COMMANDS[4] => {
                // !score <event id> <user id> <score>
                let usage = "!score <event id> <user id> <score>";
                let event_id = identifier(words.next(), usage)?;
                let user_id = identifier(words.next(), usage)?;
                let score = words
                    .next()
                    .ok_or_else(|| usage_error(usage))?
                    .parse::<i64>()
                    .map_err(|e| BoardError::Validation(format!("score is not an integer. {e}")))?;
                Ok(Command::SubmitScore(event_id, user_id, score))
            }
            cmd if cmd == COMMANDS[5] => {
                // !leaderboard <event id> [page] [limit]
                let event_id = identifier(words.next(), "!leaderboard <event id> [page] [limit]")?;
                Ok(Command::ShowLeaderboard(
                    event_id,
                    page_request(words, bounds)?,
                ))
            }
            cmd if cmd == COMMANDS[6] => Ok(Command::CacheStats),
            cmd if cmd == COMMANDS[7] => Ok(Command::ClearCaches),
            other => Err(BoardError::Validation(format!(
                "unknown command `{other}`, try !help"
            ))),
        }
    }
}

fn usage_error(usage: &str) -> BoardError {
    BoardError::Validation(format!("usage: {usage}"))
}

fn identifier(word: Option<&str>, usage: &str) -> BoardResult<Uuid> {
    let word = word.ok_or_else(|| usage_error(usage))?;
    Ok(Uuid::parse_str(word)?)
}

fn rest_as_name<'a>(words: impl Iterator<Item = &'a str>, usage: &str) -> BoardResult<String> {
    let name = words.collect::<Vec<&str>>().join(" ");
    match name.is_empty() {
        true => Err(usage_error(usage)),
        false => Ok(name),
    }
}

fn page_request<'a>(
    mut words: impl Iterator<Item = &'a str>,
    bounds: PagingBounds,
) -> BoardResult<PageRequest> {
    let mut number = |what: &str, default: u32| -> BoardResult<u32> {
        match words.next() {
            None => Ok(default),
            Some(w) => w
                .parse::<u32>()
                .map_err(|e| BoardError::Validation(format!("{what} is not a positive integer. {e}"))),
        }
    };
    let page = number("page", 1)?;
    let limit = number("limit", bounds.default_limit)?;
    PageRequest::new(page, limit, bounds.max_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: PagingBounds = PagingBounds {
        default_limit: 20,
        max_limit: 100,
    };

    #[test]
    fn recognizes_commands_by_their_first_word() {
        assert!(Command::is_command("!help"));
        assert!(Command::is_command("  !leaderboard abc"));
        assert!(Command::is_command("!events 2"));
        assert!(!Command::is_command("help"));
        assert!(!Command::is_command("!nope"));
        assert!(!Command::is_command(""));
    }

    #[test]
    fn parses_names_with_spaces() {
        assert_eq!(
            Command::parse("!event Spring  Jam 2024", BOUNDS),
            Ok(Command::CreateEvent("Spring Jam 2024".to_string()))
        );
        assert_eq!(
            Command::parse("!profile Ada Lovelace", BOUNDS),
            Ok(Command::CreateProfile("Ada Lovelace".to_string()))
        );
        assert!(matches!(
            Command::parse("!profile", BOUNDS),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn parses_score_submission() {
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            Command::parse(&format!("!score {event} {user} 80"), BOUNDS),
            Ok(Command::SubmitScore(event, user, 80))
        );
        // Sign is checked by the service, not the parser
        assert_eq!(
            Command::parse(&format!("!score {event} {user} -5"), BOUNDS),
            Ok(Command::SubmitScore(event, user, -5))
        );
        assert!(matches!(
            Command::parse(&format!("!score {event} not-a-uuid 80"), BOUNDS),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            Command::parse(&format!("!score {event} {user} lots"), BOUNDS),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            Command::parse(&format!("!score {event}"), BOUNDS),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn paging_arguments_default_and_are_bounded() {
        let event = Uuid::new_v4();
        assert_eq!(
            Command::parse(&format!("!leaderboard {event}"), BOUNDS),
            Ok(Command::ShowLeaderboard(
                event,
                PageRequest { page: 1, limit: 20 }
            ))
        );
        assert_eq!(
            Command::parse("!events 3 5", BOUNDS),
            Ok(Command::ListEvents(PageRequest { page: 3, limit: 5 }))
        );
        assert!(matches!(
            Command::parse("!events 1 500", BOUNDS),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            Command::parse("!events 0", BOUNDS),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            Command::parse("!dance", BOUNDS),
            Err(BoardError::Validation(_))
        ));
    }
}
