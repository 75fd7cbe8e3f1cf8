//! REPL input reading and command parsing

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent as a chat message
    Send(String),
    NewChat,
    ListSessions,
    Switch(String),
    Clear,
    /// Show the catalog (`None`) or select a model
    Model(Option<String>),
    Cancel,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command /{0}, try /help")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("/{0} takes no argument")]
    UnexpectedArgument(String),
}

pub const HELP: &str = "\
commands:
  /new            start a new chat
  /list           list saved chats
  /switch <id>    open a saved chat
  /clear          delete the current chat
  /model [name]   list models or pick one (/model default resets)
  /cancel         abandon the request in flight
  /quit           save and exit
anything else is sent as a message";

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Self::Send(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        match (name, arg) {
            ("new", None) => Ok(Self::NewChat),
            ("list", None) => Ok(Self::ListSessions),
            ("switch", Some(id)) => Ok(Self::Switch(id.to_string())),
            ("switch", None) => Err(CommandError::Usage("/switch <id>")),
            ("clear", None) => Ok(Self::Clear),
            ("model", arg) => Ok(Self::Model(arg.map(str::to_string))),
            ("cancel", None) => Ok(Self::Cancel),
            ("help", None) => Ok(Self::Help),
            ("quit" | "exit", None) => Ok(Self::Quit),
            ("new" | "list" | "clear" | "cancel" | "help" | "quit" | "exit", Some(_)) => {
                Err(CommandError::UnexpectedArgument(name.to_string()))
            }
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Read one line without its terminator. Bytes that are not UTF-8 are
/// replaced rather than rejected. Returns `None` at end of input.
pub async fn read_input_line<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
