//! Error types for the parser crate.

use thiserror::Error;

/// Structural problems found while parsing a style value.
///
/// [`StyleParser::parse_style`](crate::StyleParser::parse_style) recovers from
/// all of these. They only surface through
/// [`StyleParser::try_parse_style`](crate::StyleParser::try_parse_style).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A function call or group was still open at the end of the input.
    #[error("unclosed '(' opened at byte {position} in '{input}'")]
    UnclosedParen { input: String, position: usize },

    /// A `)` appeared with no open function call or group.
    #[error("unexpected ')' at byte {position} in '{input}'")]
    UnexpectedCloseParen { input: String, position: usize },

    /// A quoted string was not terminated.
    #[error("unterminated string starting at byte {position} in '{input}'")]
    UnterminatedString { input: String, position: usize },

    /// Calls and groups were nested deeper than the parser follows.
    #[error("parentheses nested too deeply at byte {position} in '{input}'")]
    TooDeep { input: String, position: usize },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;
