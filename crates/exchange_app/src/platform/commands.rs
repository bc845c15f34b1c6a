use exchange_core::{ExchangeKey, Msg, StatusCode};
use thiserror::Error;

pub const HELP: &str = "commands: list | open <key> | draft <key> <text> | send <key> [text] | mark <key> <status> | quit";

/// A line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Help,
    Quit,
    Open(ExchangeKey),
    Draft { key: ExchangeKey, text: String },
    Send { key: ExchangeKey, text: Option<String> },
    Mark { key: ExchangeKey, status: StatusCode },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{0} needs an exchange key")]
    MissingKey(&'static str),
    #[error("{0:?} is not an exchange key")]
    InvalidKey(String),
    #[error("mark needs a status code")]
    MissingStatus,
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();

    match verb {
        "" => Err(CommandError::Empty),
        "list" | "ls" => Ok(Command::List),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "open" => {
            let (key, _) = split_key("open", rest)?;
            Ok(Command::Open(key))
        }
        "draft" => {
            let (key, text) = split_key("draft", rest)?;
            Ok(Command::Draft {
                key,
                text: text.to_string(),
            })
        }
        "send" => {
            let (key, text) = split_key("send", rest)?;
            Ok(Command::Send {
                key,
                text: (!text.is_empty()).then(|| text.to_string()),
            })
        }
        "mark" => {
            let (key, status) = split_key("mark", rest)?;
            if status.is_empty() {
                return Err(CommandError::MissingStatus);
            }
            Ok(Command::Mark {
                key,
                status: StatusCode::new(status),
            })
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn split_key<'a>(verb: &'static str, rest: &'a str) -> Result<(ExchangeKey, &'a str), CommandError> {
    let (key, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if key.is_empty() {
        return Err(CommandError::MissingKey(verb));
    }
    let key = key
        .parse()
        .map_err(|_| CommandError::InvalidKey(key.to_string()))?;
    Ok((key, tail.trim_start()))
}

impl Command {
    /// The messages this command feeds into the update loop. `List`, `Help`
    /// and `Quit` are handled by the loop itself.
    pub fn into_msgs(self) -> Vec<Msg> {
        match self {
            Command::List | Command::Help | Command::Quit => Vec::new(),
            Command::Open(key) => vec![Msg::ExchangeClicked(key)],
            Command::Draft { key, text } => vec![Msg::DraftChanged { key, text }],
            Command::Send { key, text } => {
                let mut msgs = Vec::with_capacity(2);
                if let Some(text) = text {
                    msgs.push(Msg::DraftChanged { key, text });
                }
                msgs.push(Msg::ReplySubmitted { key });
                msgs
            }
            Command::Mark { key, status } => vec![Msg::StatusRequested { key, status }],
        }
    }
}

#[cfg(test)]
mod tests {
    use exchange_core::{Msg, StatusCode};
    use pretty_assertions::assert_eq;

    use super::{parse_command, Command, CommandError};

    #[test]
    fn draft_keeps_the_whole_text() {
        assert_eq!(
            parse_command("draft 3   we are  coming ").unwrap(),
            Command::Draft {
                key: 3,
                text: "we are  coming".to_string(),
            }
        );
    }

    #[test]
    fn send_with_text_drafts_first() {
        let msgs = parse_command("send 2 on our way").unwrap().into_msgs();
        assert_eq!(
            msgs,
            vec![
                Msg::DraftChanged {
                    key: 2,
                    text: "on our way".to_string(),
                },
                Msg::ReplySubmitted { key: 2 },
            ]
        );
    }

    #[test]
    fn send_without_text_submits_the_stored_draft() {
        assert_eq!(
            parse_command("send 2").unwrap().into_msgs(),
            vec![Msg::ReplySubmitted { key: 2 }]
        );
    }

    #[test]
    fn mark_requests_a_status() {
        assert_eq!(
            parse_command("mark 5 received").unwrap(),
            Command::Mark {
                key: 5,
                status: StatusCode::new("received"),
            }
        );
        assert_eq!(parse_command("mark 5"), Err(CommandError::MissingStatus));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("open"), Err(CommandError::MissingKey("open")));
        assert_eq!(
            parse_command("open x1"),
            Err(CommandError::InvalidKey("x1".to_string()))
        );
        assert_eq!(
            parse_command("fly 1"),
            Err(CommandError::Unknown("fly".to_string()))
        );
    }
}
