//! Owner console: drive intents by hand from stdin.
//!
//! ```text
//! INCREMENT
//! INCREASE_BY 5
//! SETTINGS:TOGGLE_VISIBLE add-to-do/vanilla
//! TO_DO:ADD {"title":"buy milk"}
//! after 500 INCREMENT
//! close index
//! state
//! quit
//! ```

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::protocol::WireIntent;
use crate::reducers::VisibleId;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(WireIntent),
    /// Dispatch once the delay has elapsed.
    After { delay: Duration, intent: WireIntent },
    /// User-driven close of a surface.
    Close(VisibleId),
    State,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("unknown surface '{0}'")]
    UnknownSurface(String),

    #[error("invalid delay '{0}', expected milliseconds")]
    InvalidDelay(String),
}

/// Parse `<TYPE> [payload]`.
///
/// The payload is read as JSON when it parses, otherwise as a bare string,
/// so `SETTINGS:ADD_VISIBLE index` and `SETTINGS:ADD_VISIBLE "index"` mean
/// the same thing.
pub fn parse_intent(input: &str) -> Result<WireIntent, ConsoleError> {
    let input = input.trim();
    let (kind, payload) = match input.split_once(char::is_whitespace) {
        Some((kind, rest)) => (kind, Some(rest.trim())),
        None => (input, None),
    };
    if kind.is_empty() {
        return Err(ConsoleError::Missing("intent type"));
    }

    Ok(match payload.filter(|payload| !payload.is_empty()) {
        Some(raw) => {
            let payload = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            WireIntent::with_payload(kind, payload)
        }
        None => WireIntent::new(kind),
    })
}

pub fn parse(line: &str) -> Result<Command, ConsoleError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "" => Err(ConsoleError::Missing("command")),
        "quit" | "exit" => Ok(Command::Quit),
        "state" => Ok(Command::State),
        "close" => {
            if rest.is_empty() {
                return Err(ConsoleError::Missing("surface id"));
            }
            VisibleId::parse(rest)
                .map(Command::Close)
                .ok_or_else(|| ConsoleError::UnknownSurface(rest.to_string()))
        }
        "after" => {
            let (delay, intent) = rest
                .split_once(char::is_whitespace)
                .ok_or(ConsoleError::Missing("intent after delay"))?;
            let millis = delay
                .parse::<u64>()
                .map_err(|_| ConsoleError::InvalidDelay(delay.to_string()))?;
            Ok(Command::After {
                delay: Duration::from_millis(millis),
                intent: parse_intent(intent)?,
            })
        }
        _ => parse_intent(line).map(Command::Dispatch),
    }
}
