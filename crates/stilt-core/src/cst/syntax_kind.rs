//! Node type tags drawn from the target language's grammar

use serde::{Deserialize, Serialize};

/// The closed set of node type tags.
///
/// Token kinds tag leaves that carry literal text; composite kinds tag nodes
/// that own an ordered child list. The set covers the token level of the
/// grammar completely plus the structural constructs the bundled rules need;
/// source the reference parser does not recognize structurally still round
/// trips as plain tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    // --- token kinds ---
    /// Spaces, tabs and newlines. A single token may span a line break, in
    /// which case everything after the last newline is indentation.
    Whitespace,
    /// Line or block comment, including its delimiters
    Comment,
    /// Identifier, possibly with multi-byte or diacritic characters
    Identifier,
    /// Reserved word (`fun`, `enum`, `class`, ...); the literal text holds
    /// which one
    Keyword,
    /// Integer literal, possibly with `_` digit separators
    IntegerLiteral,
    /// A literal text segment inside a string template
    StringText,
    /// The `"` delimiter of a string template
    Quote,
    /// The `${` opening a braced template entry
    TemplateOpen,
    /// The `}` closing a braced template entry
    TemplateClose,
    /// The `$` introducing a short template entry
    TemplateDollar,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// Any other single-character token
    Operator,

    // --- composite kinds ---
    /// Root of the tree; one per file
    File,
    /// `fun name(...) { ... }`
    FunctionDecl,
    /// `name(...)`
    CallExpr,
    /// Parenthesized argument list of a call or declaration
    ValueArgumentList,
    /// One argument inside a [`SyntaxKind::ValueArgumentList`]
    ValueArgument,
    /// `enum class Name { ... }`
    EnumClass,
    /// One entry inside an enum body
    EnumEntry,
    /// Braced body
    Block,
    /// A double-quoted string with optional interpolation entries
    StringTemplate,
    /// A `$name` or `${ ... }` entry inside a string template
    TemplateEntry,
}

impl SyntaxKind {
    /// Whether nodes of this kind are leaves carrying literal text.
    pub fn is_token(self) -> bool {
        !self.is_composite()
    }

    /// Whether nodes of this kind own a child list.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            SyntaxKind::File
                | SyntaxKind::FunctionDecl
                | SyntaxKind::CallExpr
                | SyntaxKind::ValueArgumentList
                | SyntaxKind::ValueArgument
                | SyntaxKind::EnumClass
                | SyntaxKind::EnumEntry
                | SyntaxKind::Block
                | SyntaxKind::StringTemplate
                | SyntaxKind::TemplateEntry
        )
    }

    /// Whether this token kind is trivia (whitespace or comments).
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::Whitespace | SyntaxKind::Comment)
    }
}
