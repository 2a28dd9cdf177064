//! Command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

use log::warn;

use super::notation::{parse_answers, parse_code, parse_code_list};

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the protocol handshake.
    Wqi,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Forget the current player's progress.
    NewGame,

    /// Set the start countries.
    Start { codes: Vec<String> },

    /// Replace the completed set.
    Completed { codes: Vec<String> },

    /// Restrict the roadmap to these countries; `None` lifts the restriction.
    Allowed { codes: Option<Vec<String>> },

    /// Emit the current roadmap pins.
    Roadmap,

    /// Complete a quiz for a country.
    Complete { code: String },

    /// Show land and sea neighbors of a country.
    Neighbors { code: String },

    /// Great-circle distance between two countries.
    Distance { from: String, to: String },

    /// Score an answer sheet.
    Score { answers: Vec<bool> },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "wqi" => Some(Command::Wqi),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "roadmap" => Some(Command::Roadmap),

        "setoption" => parse_setoption(&tokens),
        "start" => parse_list(&tokens, "start").map(|codes| Command::Start { codes }),
        "completed" => parse_list(&tokens, "completed").map(|codes| Command::Completed { codes }),
        "allowed" => parse_allowed(&tokens),
        "complete" => parse_single(&tokens, "complete").map(|code| Command::Complete { code }),
        "neighbors" => parse_single(&tokens, "neighbors").map(|code| Command::Neighbors { code }),
        "distance" => parse_distance(&tokens),
        "score" => parse_score(&tokens),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");

    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `<keyword> <codes>`.
fn parse_list(tokens: &[&str], keyword: &str) -> Option<Vec<String>> {
    if tokens.len() != 2 {
        warn!("malformed {keyword}: expected '{keyword} <codes>'");
        return None;
    }
    match parse_code_list(tokens[1]) {
        Ok(codes) => Some(codes),
        Err(e) => {
            warn!("malformed {keyword}: {e}");
            None
        }
    }
}

/// Parses `allowed <codes>`; `allowed -` lifts the restriction.
fn parse_allowed(tokens: &[&str]) -> Option<Command> {
    if tokens.len() == 2 && tokens[1] == "-" {
        return Some(Command::Allowed { codes: None });
    }
    parse_list(tokens, "allowed").map(|codes| Command::Allowed { codes: Some(codes) })
}

/// Parses `<keyword> <code>`.
fn parse_single(tokens: &[&str], keyword: &str) -> Option<String> {
    if tokens.len() != 2 {
        warn!("malformed {keyword}: expected '{keyword} <code>'");
        return None;
    }
    match parse_code(tokens[1]) {
        Ok(code) => Some(code),
        Err(e) => {
            warn!("malformed {keyword}: {e}");
            None
        }
    }
}

/// Parses `distance <code> <code>`.
fn parse_distance(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed distance: expected 'distance <code> <code>'");
        return None;
    }
    match (parse_code(tokens[1]), parse_code(tokens[2])) {
        (Ok(from), Ok(to)) => Some(Command::Distance { from, to }),
        (Err(e), _) | (_, Err(e)) => {
            warn!("malformed distance: {e}");
            None
        }
    }
}

/// Parses `score <answers>`.
fn parse_score(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 {
        warn!("malformed score: expected 'score <answers>'");
        return None;
    }
    match parse_answers(tokens[1]) {
        Ok(answers) => Some(Command::Score { answers }),
        Err(e) => {
            warn!("malformed score: {e}");
            None
        }
    }
}
