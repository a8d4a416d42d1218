//! Scripted session input.
//!
//! One event per line:
//!
//! ```text
//! open | close | toggle | mod+k | esc
//! type <text>        # replace the query text
//! clear              # empty the query
//! up | down | enter
//! wait <ms>          # advance the virtual clock
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::session::{Key, KeyEvent, SessionAction, SessionController, TimerQueue};

/// A script line that could not be parsed.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Open,
    Close,
    Toggle,
    Type(String),
    Key(KeyEvent),
    Wait(Duration),
}

impl fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptEvent::Open => f.write_str("open"),
            ScriptEvent::Close => f.write_str("close"),
            ScriptEvent::Toggle => f.write_str("toggle"),
            ScriptEvent::Type(text) => write!(f, "type {text:?}"),
            ScriptEvent::Key(event) => match (event.key, event.modifier) {
                (Key::Char(c), true) => write!(f, "mod+{c}"),
                (Key::Char(c), false) => write!(f, "{c}"),
                (Key::ArrowUp, _) => f.write_str("up"),
                (Key::ArrowDown, _) => f.write_str("down"),
                (Key::Enter, _) => f.write_str("enter"),
                (Key::Escape, _) => f.write_str("esc"),
            },
            ScriptEvent::Wait(d) => write!(f, "wait {}ms", d.as_millis()),
        }
    }
}

impl ScriptEvent {
    /// Apply the event to a session driven by a virtual clock.
    pub fn apply(&self, session: &mut SessionController<TimerQueue>) -> Option<SessionAction> {
        match self {
            ScriptEvent::Open => session.open_search(),
            ScriptEvent::Close => session.close_search(),
            ScriptEvent::Toggle => session.toggle_search(),
            ScriptEvent::Type(text) => session.set_query(text),
            ScriptEvent::Key(event) => return session.handle_key(*event),
            ScriptEvent::Wait(duration) => session.advance(*duration),
        }
        None
    }
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns the first `ScriptError`, with a 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut events = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        events.push(parse_line(trimmed).map_err(|message| ScriptError {
            line: i + 1,
            message,
        })?);
    }
    Ok(events)
}

fn parse_line(line: &str) -> Result<ScriptEvent, String> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    let event = match command.to_ascii_lowercase().as_str() {
        "open" => ScriptEvent::Open,
        "close" => ScriptEvent::Close,
        "toggle" => ScriptEvent::Toggle,
        "type" => ScriptEvent::Type(rest.to_string()),
        "clear" => ScriptEvent::Type(String::new()),
        "up" => ScriptEvent::Key(KeyEvent::plain(Key::ArrowUp)),
        "down" => ScriptEvent::Key(KeyEvent::plain(Key::ArrowDown)),
        "enter" => ScriptEvent::Key(KeyEvent::plain(Key::Enter)),
        "esc" | "escape" => ScriptEvent::Key(KeyEvent::plain(Key::Escape)),
        "mod+k" | "ctrl+k" | "cmd+k" => ScriptEvent::Key(KeyEvent::with_modifier(Key::Char('k'))),
        "wait" => {
            let ms: u64 = rest
                .trim()
                .trim_end_matches("ms")
                .parse()
                .map_err(|_| format!("invalid wait duration '{}'", rest.trim()))?;
            ScriptEvent::Wait(Duration::from_millis(ms))
        }
        other => return Err(format!("unknown event '{other}'")),
    };
    Ok(event)
}
