//! Tree evaluation
//!
//! Both operands of `&` and `|` are always evaluated, so every function
//! referenced by an expression is called on each evaluation.

use super::arena::{Arena, AstNode, NodeId};
use super::parser::Expression;
use super::registry::FunctionTable;

/// Evaluate an optional expression; a missing one is `false`
pub fn evaluate<F: FunctionTable + ?Sized>(
    expression: Option<&Expression<'_>>,
    functions: &F,
) -> bool {
    expression.is_some_and(|e| e.evaluate(functions))
}

pub(crate) fn evaluate_node<F: FunctionTable + ?Sized>(
    arena: &Arena,
    id: NodeId,
    functions: &F,
) -> bool {
    match arena.get(id) {
        Some(&AstNode::And(left, right)) => {
            let left = evaluate_node(arena, left, functions);
            let right = evaluate_node(arena, right, functions);
            left && right
        }
        Some(&AstNode::Or(left, right)) => {
            let left = evaluate_node(arena, left, functions);
            let right = evaluate_node(arena, right, functions);
            left || right
        }
        Some(&AstNode::Not(child)) => !evaluate_node(arena, child, functions),
        Some(&AstNode::Function(function)) => functions.call(function),
        Some(&AstNode::Literal(value)) => value,
        None => false,
    }
}
