//! Trigger expression lexer

use super::error::ParseError;
use super::registry::MAX_FUNCTIONS;

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    /// No token read yet
    #[default]
    Error,
    And,
    Or,
    Not,
    OpenParen,
    CloseParen,
    /// Function id (0-15)
    Number,
    /// `T` or `F`
    BoolChar,
    EndOfText,
}

/// A lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Token {
    pub kind: TokenKind,
    /// Function id for `Number`, 1/0 for `BoolChar`
    pub value: u8,
    /// Source character for operators and literals, 0 otherwise
    pub symbol: u8,
    /// Byte offset of the token in the source text
    pub position: usize,
}

/// Byte-oriented lexer over an expression string
pub struct Lexer<'t> {
    source: &'t str,
    text: &'t [u8],
    index: usize,
}

impl<'t> Lexer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            source: text,
            text: text.as_bytes(),
            index: 0,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.index
    }

    fn skip_whitespace(&mut self) {
        while self
            .text
            .get(self.index)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.index += 1;
        }
    }

    /// Read the next token
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let position = self.index;
        let Some(&byte) = self.text.get(position) else {
            return Ok(Token {
                kind: TokenKind::EndOfText,
                position,
                ..Token::default()
            });
        };

        if byte.is_ascii_digit() {
            let value = self.read_number()?;
            return Ok(Token {
                kind: TokenKind::Number,
                value,
                symbol: byte,
                position,
            });
        }

        let (kind, value) = match byte {
            b'T' => (TokenKind::BoolChar, 1),
            b'F' => (TokenKind::BoolChar, 0),
            b'&' => (TokenKind::And, 0),
            b'|' => (TokenKind::Or, 0),
            b'!' => (TokenKind::Not, 0),
            b'(' => (TokenKind::OpenParen, 0),
            b')' => (TokenKind::CloseParen, 0),
            _ => {
                // Only ASCII is consumed, so `position` is a char boundary
                let ch = self.source[position..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(ParseError::Lex { ch, position });
            }
        };
        self.index += 1;

        Ok(Token {
            kind,
            value,
            symbol: byte,
            position,
        })
    }

    /// Read a greedy run of digits as a function id
    fn read_number(&mut self) -> Result<u8, ParseError> {
        let mut value: u32 = 0;
        let mut truncated = false;
        while let Some(&b) = self.text.get(self.index).filter(|b| b.is_ascii_digit()) {
            if value > u8::MAX as u32 {
                truncated = true;
            } else {
                value = value * 10 + (b - b'0') as u32;
            }
            self.index += 1;
        }

        if value > u8::MAX as u32 {
            return Err(ParseError::NumberTooLarge { value, truncated });
        }
        if value as usize >= MAX_FUNCTIONS {
            return Err(ParseError::FunctionIdOutOfRange { value: value as u8 });
        }
        Ok(value as u8)
    }
}
