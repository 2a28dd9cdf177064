//! Compact text notation for protocol arguments.
//!
//! Country lists are comma-separated alpha-2 codes (`es,PT,fr`), with `-`
//! for the empty list. Codes are uppercased on the way in. Quiz answer
//! sheets are strings of `1` (correct) and `0` (wrong).

use thiserror::Error;

/// Errors that can occur when parsing protocol arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid country code '{0}', expected two letters")]
    InvalidCode(String),

    #[error("invalid answer '{0}', expected '1' or '0'")]
    InvalidAnswer(char),
}

/// Parses a single country code.
pub fn parse_code(s: &str) -> Result<String, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(NotationError::InvalidCode(s.to_string()));
    }
    Ok(s.to_ascii_uppercase())
}

/// Parses a comma-separated code list. `-` is the empty list; blank
/// entries between commas are skipped.
pub fn parse_code_list(s: &str) -> Result<Vec<String>, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    if s == "-" {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_code)
        .collect()
}

/// Formats a code list, `-` when empty.
pub fn format_code_list<S: AsRef<str>>(codes: &[S]) -> String {
    if codes.is_empty() {
        return "-".to_string();
    }
    codes
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(",")
}

/// Parses an answer sheet like `11010`.
pub fn parse_answers(s: &str) -> Result<Vec<bool>, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    s.chars()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            other => Err(NotationError::InvalidAnswer(other)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_uppercased() {
        assert_eq!(parse_code("es"), Ok("ES".to_string()));
        assert_eq!(parse_code(" Pt "), Ok("PT".to_string()));
    }

    #[test]
    fn bad_codes_are_rejected() {
        assert_eq!(parse_code(""), Err(NotationError::EmptyInput));
        assert_eq!(parse_code("ESP"), Err(NotationError::InvalidCode("ESP".into())));
        assert_eq!(parse_code("E1"), Err(NotationError::InvalidCode("E1".into())));
    }

    #[test]
    fn code_lists() {
        assert_eq!(
            parse_code_list("es,PT, fr").unwrap(),
            vec!["ES".to_string(), "PT".to_string(), "FR".to_string()]
        );
        assert_eq!(parse_code_list("-").unwrap(), Vec::<String>::new());
        assert_eq!(parse_code_list("es,,pt,").unwrap().len(), 2);
        assert_eq!(parse_code_list(""), Err(NotationError::EmptyInput));
        assert!(parse_code_list("es,spain").is_err());
    }

    #[test]
    fn empty_list_formats_as_dash() {
        assert_eq!(format_code_list::<String>(&[]), "-");
        assert_eq!(format_code_list(&["AD", "FR"]), "AD,FR");
    }

    #[test]
    fn answer_sheets() {
        assert_eq!(parse_answers("101").unwrap(), vec![true, false, true]);
        assert_eq!(parse_answers("1x"), Err(NotationError::InvalidAnswer('x')));
        assert_eq!(parse_answers(""), Err(NotationError::EmptyInput));
    }
}
