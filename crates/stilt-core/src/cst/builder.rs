//! Event-style tree construction
//!
//! External parsers produce trees through this builder: open a composite,
//! emit tokens, close the composite. Every token of the source must be
//! emitted, including whitespace and comments, for the losslessness invariant
//! to hold.

use crate::cst::SyntaxKind;
use crate::cst::tree::{NodeId, SyntaxTree};
use crate::error::StiltError;
use crate::result::Result;

/// Builds a [`SyntaxTree`] from start-node/token/finish-node events.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start building a tree rooted at a composite of `root_kind`.
    pub fn new(root_kind: SyntaxKind) -> Result<Self> {
        let tree = SyntaxTree::new(root_kind)?;
        let root = tree.root();
        Ok(Self {
            tree,
            stack: vec![root],
        })
    }

    fn current(&self) -> NodeId {
        // The stack always holds at least the root.
        self.stack[self.stack.len() - 1]
    }

    /// Open a composite node as a child of the current node.
    pub fn start_node(&mut self, kind: SyntaxKind) -> Result<()> {
        let node = self.tree.alloc_composite(kind)?;
        self.tree.push_child(self.current(), node)?;
        self.stack.push(node);
        Ok(())
    }

    /// Emit a token as a child of the current node.
    pub fn token(&mut self, kind: SyntaxKind, text: impl Into<String>) -> Result<()> {
        let token = self.tree.alloc_token(kind, text)?;
        self.tree.push_child(self.current(), token)
    }

    /// Close the most recently opened composite.
    pub fn finish_node(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(StiltError::tree_error(
                "finish_node without a matching start_node",
            ));
        }
        self.stack.pop();
        Ok(())
    }

    /// Finish building. Fails if a composite is still open.
    pub fn finish(mut self) -> Result<SyntaxTree> {
        if self.stack.len() != 1 {
            return Err(StiltError::tree_error(format!(
                "{} composite node(s) left open",
                self.stack.len() - 1
            )));
        }
        self.tree.reset_edit_generation();
        Ok(self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_composites_losslessly() {
        let mut builder = TreeBuilder::new(SyntaxKind::File).unwrap();
        builder.token(SyntaxKind::Identifier, "x").unwrap();
        builder.start_node(SyntaxKind::ValueArgumentList).unwrap();
        builder.token(SyntaxKind::LParen, "(").unwrap();
        builder.token(SyntaxKind::IntegerLiteral, "1").unwrap();
        builder.token(SyntaxKind::RParen, ")").unwrap();
        builder.finish_node().unwrap();
        let tree = builder.finish().unwrap();
        assert_eq!(tree.text(), "x(1)");
        assert_eq!(tree.edit_generation(), 0);
    }

    #[test]
    fn unbalanced_builders_fail_to_finish() {
        let mut builder = TreeBuilder::new(SyntaxKind::File).unwrap();
        builder.start_node(SyntaxKind::Block).unwrap();
        assert!(builder.finish().is_err());
    }

    #[test]
    fn finish_node_on_the_root_is_an_error() {
        let mut builder = TreeBuilder::new(SyntaxKind::File).unwrap();
        assert!(builder.finish_node().is_err());
    }
}
