//! Fixed-capacity node storage
//!
//! Nodes refer to each other by 8-bit handles into the arena rather than by
//! pointer, so a parsed tree is plain data owned by the parser.

use heapless::Vec;

use super::error::ParseError;
use super::registry::FunctionId;

/// Nodes available to a single parse
pub const MAX_NODES: usize = 128;

/// Handle to a node in an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(u8);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Expression tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AstNode {
    And(NodeId, NodeId),
    Or(NodeId, NodeId),
    Not(NodeId),
    Function(FunctionId),
    Literal(bool),
}

/// Node storage for one parsed expression
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<AstNode, MAX_NODES>,
}

impl Arena {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Drop every node
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Store a node and return its handle
    pub fn alloc(&mut self, node: AstNode) -> Result<NodeId, ParseError> {
        let id = NodeId(self.nodes.len() as u8);
        self.nodes
            .push(node)
            .map_err(|_| ParseError::ArenaExhausted)?;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    /// Nodes in use
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
