//! Arena-based lossless syntax tree
//!
//! Nodes live in a single arena and are addressed by stable [`NodeId`]
//! indices. Parent and sibling relations are index lookups, never owning
//! references, so structural edits are index rewrites and the representational
//! cycles (child → parent → child) carry no ownership. A detached node keeps
//! its arena slot, which keeps every `NodeId` handed out during a session
//! valid for lookups, but it is no longer reachable from the root and does not
//! contribute to the rendered text.
//!
//! Losslessness invariant: concatenating the literal text of all tokens in
//! tree order reproduces the exact source the tree was built from, as long as
//! no edit was applied.

use crate::cst::SyntaxKind;
use crate::diagnostics::Position;
use crate::error::StiltError;
use crate::result::Result;

/// Stable index of a node within a [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
enum NodeContent {
    Composite { children: Vec<NodeId> },
    Token { text: String },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    content: NodeContent,
}

/// Mutable, lossless syntax tree for one source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    edits: u64,
}

impl SyntaxTree {
    /// Create a tree containing only an empty root composite.
    pub fn new(root_kind: SyntaxKind) -> Result<Self> {
        if !root_kind.is_composite() {
            return Err(StiltError::tree_error(format!(
                "root kind {root_kind:?} is not a composite kind"
            )));
        }
        Ok(Self {
            nodes: vec![NodeData {
                kind: root_kind,
                parent: None,
                content: NodeContent::Composite {
                    children: Vec::new(),
                },
            }],
            root: NodeId(0),
            edits: 0,
        })
    }

    /// The root node; always attached, never removable.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Monotonic counter bumped by every mutation. Anything derived from tree
    /// shape (positions, offsets) is stale once this changes.
    pub fn edit_generation(&self) -> u64 {
        self.edits
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Allocate a detached composite node.
    pub fn alloc_composite(&mut self, kind: SyntaxKind) -> Result<NodeId> {
        if !kind.is_composite() {
            return Err(StiltError::tree_error(format!(
                "{kind:?} is not a composite kind"
            )));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            content: NodeContent::Composite {
                children: Vec::new(),
            },
        });
        Ok(id)
    }

    /// Allocate a detached token node carrying literal text.
    pub fn alloc_token(&mut self, kind: SyntaxKind, text: impl Into<String>) -> Result<NodeId> {
        if !kind.is_token() {
            return Err(StiltError::tree_error(format!(
                "{kind:?} is not a token kind"
            )));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            content: NodeContent::Token { text: text.into() },
        });
        Ok(id)
    }

    /// Type tag of a node.
    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    /// Whether the node is a token leaf.
    pub fn is_token(&self, id: NodeId) -> bool {
        matches!(self.node(id).content, NodeContent::Token { .. })
    }

    /// Literal text of a token node, `None` for composites.
    pub fn token_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).content {
            NodeContent::Token { text } => Some(text),
            NodeContent::Composite { .. } => None,
        }
    }

    /// Ordered children of a composite; empty for tokens.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).content {
            NodeContent::Composite { children } => children,
            NodeContent::Token { .. } => &[],
        }
    }

    /// Parent of a node; `None` for the root and for detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// First child of a composite.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Parent and child index of an attached, non-root node.
    pub fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, index))
    }

    /// Previous sibling under the same parent.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        if index == 0 {
            None
        } else {
            Some(self.children(parent)[index - 1])
        }
    }

    /// Next sibling under the same parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn ensure_detached(&self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(StiltError::tree_error("the root node cannot be re-attached"));
        }
        if self.parent(id).is_some() {
            return Err(StiltError::tree_error(
                "node is already attached; detach it before re-attaching",
            ));
        }
        Ok(())
    }

    fn ensure_no_cycle(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut current = Some(parent);
        while let Some(node) = current {
            if node == child {
                return Err(StiltError::tree_error(
                    "attaching a node below itself would create a cycle",
                ));
            }
            current = self.parent(node);
        }
        Ok(())
    }

    fn attach_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.ensure_detached(child)?;
        self.ensure_no_cycle(parent, child)?;
        match &mut self.node_mut(parent).content {
            NodeContent::Composite { children } => children.insert(index, child),
            NodeContent::Token { .. } => {
                return Err(StiltError::tree_error("cannot attach a child to a token"));
            }
        }
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Append a detached node as the last child of a composite.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.children(parent).len();
        self.attach_at(parent, index, child)?;
        self.edits += 1;
        Ok(())
    }

    /// Insert a detached node immediately before an attached anchor.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let (parent, index) = self
            .position_in_parent(anchor)
            .ok_or_else(|| StiltError::tree_error("anchor node is detached or the root"))?;
        self.attach_at(parent, index, node)?;
        self.edits += 1;
        Ok(())
    }

    /// Insert a detached node immediately after an attached anchor.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        let (parent, index) = self
            .position_in_parent(anchor)
            .ok_or_else(|| StiltError::tree_error("anchor node is detached or the root"))?;
        self.attach_at(parent, index + 1, node)?;
        self.edits += 1;
        Ok(())
    }

    /// Detach a node from its parent. The node keeps its arena slot and can be
    /// re-attached elsewhere.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let (parent, index) = self
            .position_in_parent(id)
            .ok_or_else(|| StiltError::tree_error("cannot remove the root or a detached node"))?;
        match &mut self.node_mut(parent).content {
            NodeContent::Composite { children } => {
                children.remove(index);
            }
            NodeContent::Token { .. } => unreachable!("parent of an attached node is a composite"),
        }
        self.node_mut(id).parent = None;
        self.edits += 1;
        Ok(())
    }

    /// Replace an attached node with zero or more detached nodes, in order.
    pub fn replace(&mut self, id: NodeId, replacements: &[NodeId]) -> Result<()> {
        let (parent, index) = self
            .position_in_parent(id)
            .ok_or_else(|| StiltError::tree_error("cannot replace the root or a detached node"))?;
        for &replacement in replacements {
            self.ensure_detached(replacement)?;
            self.ensure_no_cycle(parent, replacement)?;
        }
        match &mut self.node_mut(parent).content {
            NodeContent::Composite { children } => {
                children.remove(index);
            }
            NodeContent::Token { .. } => unreachable!("parent of an attached node is a composite"),
        }
        self.node_mut(id).parent = None;
        for (offset, &replacement) in replacements.iter().enumerate() {
            match &mut self.node_mut(parent).content {
                NodeContent::Composite { children } => children.insert(index + offset, replacement),
                NodeContent::Token { .. } => unreachable!(),
            }
            self.node_mut(replacement).parent = Some(parent);
        }
        self.edits += 1;
        Ok(())
    }

    /// Overwrite the literal text of a token.
    pub fn set_token_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id).content {
            NodeContent::Token { text: slot } => {
                *slot = text.into();
                self.edits += 1;
                Ok(())
            }
            NodeContent::Composite { .. } => {
                Err(StiltError::tree_error("cannot set text on a composite node"))
            }
        }
    }

    /// Reset the edit counter once initial construction is done, so that a
    /// freshly parsed tree reports generation zero.
    pub(crate) fn reset_edit_generation(&mut self) {
        self.edits = 0;
    }

    /// Next node in depth-first pre-order, resolved from the live tree.
    ///
    /// Returns `None` once traversal leaves the subtree below `root`, or when
    /// `id` is detached.
    pub fn next_preorder(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut current = id;
        loop {
            if current == root {
                return None;
            }
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Tokens below `id` in tree order.
    pub fn tokens_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut tokens = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.is_token(node) {
                tokens.push(node);
            } else {
                stack.extend(self.children(node).iter().rev());
            }
        }
        tokens
    }

    /// All tokens of the tree in order.
    pub fn tokens(&self) -> Vec<NodeId> {
        self.tokens_of(self.root)
    }

    /// The last token of the tree, if any.
    pub fn last_token(&self) -> Option<NodeId> {
        self.tokens().last().copied()
    }

    /// Reconstruct the literal text below a node by concatenating its tokens.
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        for token in self.tokens_of(id) {
            if let Some(text) = self.token_text(token) {
                out.push_str(text);
            }
        }
        out
    }

    /// Render the full tree back to source text.
    pub fn text(&self) -> String {
        self.text_of(self.root)
    }

    /// Byte offset of the first token at or below a node, relative to the
    /// current tree shape. `None` for detached nodes.
    ///
    /// Recomputed per call by walking tokens from the file start; never cached
    /// across mutations.
    pub fn start_offset(&self, id: NodeId) -> Option<usize> {
        if !self.is_attached(id) {
            return None;
        }
        let mut offset = 0usize;
        let mut current = Some(self.root);
        while let Some(node) = current {
            if node == id {
                return Some(offset);
            }
            if let Some(text) = self.token_text(node) {
                offset += text.len();
            }
            current = self.next_preorder(node, self.root);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_source;

    #[test]
    fn unmodified_tree_renders_the_exact_source() {
        let source = "fun main() {\n    x(1,  3)\n}\n";
        let tree = parse_source(source).unwrap();
        assert_eq!(tree.text(), source);
    }

    #[test]
    fn set_token_text_rewrites_only_that_token() {
        let source = "x(1,  3)";
        let mut tree = parse_source(source).unwrap();
        let wide_space = tree
            .tokens()
            .into_iter()
            .find(|&t| tree.token_text(t) == Some("  "))
            .unwrap();
        tree.set_token_text(wide_space, " ").unwrap();
        assert_eq!(tree.text(), "x(1, 3)");
    }

    #[test]
    fn remove_detaches_but_keeps_the_slot_valid() {
        let mut tree = parse_source("a b").unwrap();
        let space = tree
            .tokens()
            .into_iter()
            .find(|&t| tree.kind(t) == SyntaxKind::Whitespace)
            .unwrap();
        tree.remove(space).unwrap();
        assert_eq!(tree.text(), "ab");
        assert!(!tree.is_attached(space));
        assert_eq!(tree.token_text(space), Some(" "));
        assert_eq!(tree.start_offset(space), None);
    }

    #[test]
    fn replace_splices_in_order() {
        let mut tree = parse_source("a").unwrap();
        let ident = tree
            .tokens()
            .into_iter()
            .find(|&t| tree.kind(t) == SyntaxKind::Identifier)
            .unwrap();
        let b = tree.alloc_token(SyntaxKind::Identifier, "b").unwrap();
        let space = tree.alloc_token(SyntaxKind::Whitespace, " ").unwrap();
        let c = tree.alloc_token(SyntaxKind::Identifier, "c").unwrap();
        tree.replace(ident, &[b, space, c]).unwrap();
        assert_eq!(tree.text(), "b c");
    }

    #[test]
    fn insert_before_and_after_anchor() {
        let mut tree = parse_source("b").unwrap();
        let ident = tree
            .tokens()
            .into_iter()
            .find(|&t| tree.kind(t) == SyntaxKind::Identifier)
            .unwrap();
        let before = tree.alloc_token(SyntaxKind::Identifier, "a").unwrap();
        let after = tree.alloc_token(SyntaxKind::Identifier, "c").unwrap();
        tree.insert_before(ident, before).unwrap();
        tree.insert_after(ident, after).unwrap();
        assert_eq!(tree.text(), "abc");
    }

    #[test]
    fn edits_bump_the_generation_counter() {
        let mut tree = parse_source("a  b").unwrap();
        let generation = tree.edit_generation();
        let space = tree
            .tokens()
            .into_iter()
            .find(|&t| tree.kind(t) == SyntaxKind::Whitespace)
            .unwrap();
        tree.set_token_text(space, " ").unwrap();
        assert!(tree.edit_generation() > generation);
    }

    #[test]
    fn attached_nodes_cannot_be_attached_twice() {
        let mut tree = parse_source("a b").unwrap();
        let tokens = tree.tokens();
        let first = tokens[0];
        let last = *tokens.last().unwrap();
        assert!(tree.insert_after(last, first).is_err());
    }

    #[test]
    fn root_cannot_be_removed_or_replaced() {
        let mut tree = parse_source("a").unwrap();
        let root = tree.root();
        assert!(tree.remove(root).is_err());
        assert!(tree.replace(root, &[]).is_err());
    }
}
