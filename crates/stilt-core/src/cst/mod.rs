//! Lossless concrete syntax tree
//!
//! The tree is mutable in place and position-free: nodes carry no offsets, so
//! structural edits are local index rewrites and line/column information is
//! derived on demand from the live tree. Concatenating every token's literal
//! text in tree order always reproduces the text the tree currently
//! represents; for an unedited tree that is the exact original source.
//!
//! Construction happens once per file, either through the bundled reference
//! [`parser`] or through [`TreeBuilder`] for callers that bring their own
//! parser. After the initial parse the tree is the single source of truth;
//! edits never require re-parsing.

mod builder;
mod lexer;
mod parser;
mod position;
mod syntax_kind;
mod tree;

pub use builder::TreeBuilder;
pub use lexer::{LexError, LexedToken, lex};
pub use parser::parse_source;
pub use syntax_kind::SyntaxKind;
pub use tree::{NodeId, SyntaxTree};
