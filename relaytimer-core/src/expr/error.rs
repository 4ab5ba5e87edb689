//! Expression engine errors

use core::fmt;

use super::arena::MAX_NODES;

/// Broad category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Bad character in the source text
    Lex,
    /// Tokens in the wrong order
    Syntax,
    /// Node arena, nesting or function id limit exceeded
    ResourceExhausted,
}

/// Why an expression failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Character outside the expression alphabet
    Lex { ch: char, position: usize },
    /// Token not allowed here (`None` for end of text)
    Syntax { symbol: Option<char>, position: usize },
    /// `(` without a matching `)`
    UnmatchedParen { position: usize },
    /// Number above 255
    ///
    /// `value` holds the leading digits up to the first one past 255;
    /// `truncated` is set when more digits followed.
    NumberTooLarge { value: u32, truncated: bool },
    /// Function id above 15
    FunctionIdOutOfRange { value: u8 },
    /// More than the arena can hold
    ArenaExhausted,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex { .. } => ErrorKind::Lex,
            ParseError::Syntax { .. } | ParseError::UnmatchedParen { .. } => ErrorKind::Syntax,
            ParseError::NumberTooLarge { .. }
            | ParseError::FunctionIdOutOfRange { .. }
            | ParseError::ArenaExhausted => ErrorKind::ResourceExhausted,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex { ch, position } => write!(f, "unexpected '{}' at {}", ch, position),
            ParseError::Syntax {
                symbol: Some(symbol),
                position,
            } => write!(f, "unexpected '{}' at {}", symbol, position),
            ParseError::Syntax {
                symbol: None,
                position,
            } => write!(f, "unexpected end at {}", position),
            ParseError::UnmatchedParen { position } => write!(f, "expected ')' at {}", position),
            ParseError::NumberTooLarge {
                value,
                truncated: false,
            } => write!(f, "id {} exceeds 255", value),
            ParseError::NumberTooLarge {
                value,
                truncated: true,
            } => write!(f, "id {}... exceeds 255", value),
            ParseError::FunctionIdOutOfRange { value } => write!(f, "id {} exceeds 15", value),
            ParseError::ArenaExhausted => write!(f, "node limit {} exceeded", MAX_NODES),
        }
    }
}

/// Function registration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Id outside 0-15
    InvalidFunctionId(u8),
}
