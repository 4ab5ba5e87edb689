//! Recursive-descent parser for trigger expressions
//!
//! ```text
//! Expression := OrChain ( '&' OrChain )*
//! OrChain    := Factor ( '|' Factor )*
//! Factor     := '(' Expression ')' | '!' Factor | Number | 'T' | 'F'
//! ```
//!
//! Each chain ends in an identity literal (`true` for `&`, `false` for
//! `|`), so `1` parses as `And(Or(1, false), true)`. Tail nodes are built
//! as `Op(rest_of_chain, next_operand)`.

use core::fmt::{self, Write};

use heapless::String;

use super::arena::{Arena, AstNode, NodeId, MAX_NODES};
use super::error::ParseError;
use super::eval;
use super::registry::{FunctionId, FunctionTable};
use super::token::{Lexer, Token, TokenKind};

/// Longest stored error message
pub const ERROR_MESSAGE_LEN: usize = 29;

/// Expression parser owning the node arena
///
/// A parsed [`Expression`] borrows the arena, so it cannot outlive the
/// next call to [`Parser::parse`].
#[derive(Debug, Default)]
pub struct Parser {
    arena: Arena,
    success: bool,
    error_message: String<ERROR_MESSAGE_LEN>,
}

/// A successfully parsed expression
#[derive(Debug, Clone, Copy)]
pub struct Expression<'a> {
    arena: &'a Arena,
    root: NodeId,
}

impl<'a> Expression<'a> {
    /// Evaluate against a function table
    pub fn evaluate<F: FunctionTable + ?Sized>(&self, functions: &F) -> bool {
        eval::evaluate_node(self.arena, self.root, functions)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&'a AstNode> {
        self.arena.get(id)
    }

    /// Nodes in the tree
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            success: false,
            error_message: String::new(),
        }
    }

    /// Parse `text`, replacing any previously parsed expression
    pub fn parse<'p>(&'p mut self, text: &str) -> Result<Expression<'p>, ParseError> {
        self.arena.reset();
        self.error_message.clear();

        let result = {
            let mut state = ParseState {
                lexer: Lexer::new(text),
                current: Token::default(),
                arena: &mut self.arena,
                depth: 0,
            };
            state.run()
        };

        match result {
            Ok(root) => {
                self.success = true;
                Ok(Expression {
                    arena: &self.arena,
                    root,
                })
            }
            Err(error) => {
                self.success = false;
                let _ = write!(Truncating(&mut self.error_message), "{}", error);
                #[cfg(feature = "defmt")]
                defmt::trace!("expression rejected: {}", error);
                Err(error)
            }
        }
    }

    /// Whether the last parse succeeded
    pub fn success(&self) -> bool {
        self.success
    }

    /// Message describing the last failure, empty after a success
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Writes as much as fits and drops the rest
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

struct ParseState<'t, 'a> {
    lexer: Lexer<'t>,
    current: Token,
    arena: &'a mut Arena,
    depth: usize,
}

impl ParseState<'_, '_> {
    fn run(&mut self) -> Result<NodeId, ParseError> {
        self.advance()?;
        let root = self.expression()?;
        if self.current.kind != TokenKind::EndOfText {
            return Err(self.unexpected());
        }
        Ok(root)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        let symbol = match self.current.kind {
            TokenKind::EndOfText | TokenKind::Error => None,
            _ => Some(self.current.symbol as char),
        };
        ParseError::Syntax {
            symbol,
            position: self.current.position,
        }
    }

    /// Run `f` one nesting level deeper
    ///
    /// Every level allocates at least one node, so nesting deeper than the
    /// arena could never complete.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NODES {
            return Err(ParseError::ArenaExhausted);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<NodeId, ParseError> {
        self.nested(|s| {
            let chain = s.or_chain()?;
            let tail = s.and_tail()?;
            s.arena.alloc(AstNode::And(chain, tail))
        })
    }

    fn and_tail(&mut self) -> Result<NodeId, ParseError> {
        if self.current.kind != TokenKind::And {
            return self.arena.alloc(AstNode::Literal(true));
        }
        self.nested(|s| {
            s.advance()?;
            let chain = s.or_chain()?;
            let rest = s.and_tail()?;
            s.arena.alloc(AstNode::And(rest, chain))
        })
    }

    fn or_chain(&mut self) -> Result<NodeId, ParseError> {
        self.nested(|s| {
            let factor = s.factor()?;
            let tail = s.or_tail()?;
            s.arena.alloc(AstNode::Or(factor, tail))
        })
    }

    fn or_tail(&mut self) -> Result<NodeId, ParseError> {
        if self.current.kind != TokenKind::Or {
            return self.arena.alloc(AstNode::Literal(false));
        }
        self.nested(|s| {
            s.advance()?;
            let factor = s.factor()?;
            let rest = s.or_tail()?;
            s.arena.alloc(AstNode::Or(rest, factor))
        })
    }

    fn factor(&mut self) -> Result<NodeId, ParseError> {
        match self.current.kind {
            TokenKind::OpenParen => self.nested(|s| {
                s.advance()?;
                let inner = s.expression()?;
                if s.current.kind != TokenKind::CloseParen {
                    return Err(ParseError::UnmatchedParen {
                        position: s.current.position,
                    });
                }
                s.advance()?;
                Ok(inner)
            }),
            TokenKind::Not => self.nested(|s| {
                s.advance()?;
                let operand = s.factor()?;
                s.arena.alloc(AstNode::Not(operand))
            }),
            TokenKind::Number => {
                let id = FunctionId::new(self.current.value).ok_or(
                    ParseError::FunctionIdOutOfRange {
                        value: self.current.value,
                    },
                )?;
                self.advance()?;
                self.arena.alloc(AstNode::Function(id))
            }
            TokenKind::BoolChar => {
                let value = self.current.value != 0;
                self.advance()?;
                self.arena.alloc(AstNode::Literal(value))
            }
            _ => Err(self.unexpected()),
        }
    }
}
