//! Line protocol handling.
//!
//! Parsing for the commands the engine reads on stdin and the compact
//! notation used for country lists and answer sheets.

pub mod notation;
pub mod parser;

pub use notation::{format_code_list, parse_answers, parse_code, parse_code_list, NotationError};
pub use parser::{parse_command, Command};
