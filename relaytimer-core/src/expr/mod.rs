//! Trigger expression engine
//!
//! Compiles a boolean expression over numbered functions into a tree held
//! in a fixed node arena, then evaluates it against a [`FunctionTable`].
//!
//! ```text
//! "0&!4"  ->  Lexer -> Parser -> Arena (<= 128 nodes) -> evaluate(table)
//! ```

mod arena;
mod error;
mod eval;
mod parser;
mod registry;
mod token;

pub use arena::{Arena, AstNode, NodeId, MAX_NODES};
pub use error::{ErrorKind, ParseError, RegistryError};
pub use eval::evaluate;
pub use parser::{Expression, Parser, ERROR_MESSAGE_LEN};
pub use registry::{BoolFn, FunctionId, FunctionRegistry, FunctionTable, MAX_FUNCTIONS};
pub use token::{Lexer, Token, TokenKind};
