//! Error types for the command line grammar.

use thiserror::Error;

/// Convenience type alias for Results using [`ParseError`].
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Errors produced while interpreting a single token.
///
/// Header parsing and tokenizing never fail (a line that does not carry the
/// prefix is simply not a command), so these only surface from the typed
/// helpers such as [`crate::parse_id`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The token was empty.
    #[error("empty token")]
    Empty,

    /// The token is not a snowflake id or a mention.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// The token is a mention of the wrong kind (e.g. a role where a
    /// member was expected).
    #[error("unexpected mention kind in {0}")]
    WrongMentionKind(String),
}
