//! Error types for the IMP frontend.

use crate::token::Location;
use thiserror::Error;

/// Errors produced while lexing or parsing source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A character with no meaning in the language.
    #[error("{location}: unexpected character '{found}'")]
    UnexpectedChar { location: Location, found: char },

    /// A string literal that never closes.
    #[error("{location}: unterminated string")]
    UnterminatedString { location: Location },

    /// An integer literal that does not fit a 64-bit signed integer.
    #[error("{location}: integer literal '{literal}' out of range")]
    IntegerOutOfRange { location: Location, literal: String },

    /// A token appeared where a different one was required.
    #[error("{location}: unexpected {found}, expecting {expected}")]
    UnexpectedToken {
        location: Location,
        found: String,
        expected: String,
    },

    /// The input ended while more tokens were required.
    #[error("unexpected end of input, expecting {expected}")]
    UnexpectedEof { expected: String },
}
