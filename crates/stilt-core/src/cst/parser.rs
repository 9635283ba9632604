//! Reference parser
//!
//! Arranges the lexed token stream into the structural composites the bundled
//! rules care about: call expressions with argument lists, enum classes with
//! entries, string templates with interpolation entries, and braced blocks.
//! Anything else stays a plain token child of the enclosing composite, so
//! unrecognized source still round trips byte-for-byte.
//!
//! A full grammar is deliberately out of scope; callers with a richer parser
//! can build trees directly through [`TreeBuilder`].

use crate::cst::SyntaxKind;
use crate::cst::builder::TreeBuilder;
use crate::cst::lexer::{LexedToken, lex};
use crate::cst::tree::SyntaxTree;
use crate::error::StiltError;
use crate::result::Result;

/// Parse source text into a lossless syntax tree.
pub fn parse_source(source: &str) -> Result<SyntaxTree> {
    let tokens = lex(source).map_err(|e| {
        let (line, column) = line_col_at(source, e.offset);
        StiltError::parse_error(line, column, e.message)
    })?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        builder: TreeBuilder::new(SyntaxKind::File)?,
    };
    parser.parse_file()?;
    parser.builder.finish()
}

fn line_col_at(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    let mut byte = 0;
    for ch in source.chars() {
        if byte >= offset {
            break;
        }
        byte += ch.len_utf8();
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

struct Parser {
    tokens: Vec<LexedToken>,
    pos: usize,
    builder: TreeBuilder,
}

impl Parser {
    fn kind_at(&self, offset: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.kind_at(0)
    }

    fn current_text(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|t| t.text.as_str())
    }

    /// Emit the current token into the tree and advance.
    fn bump(&mut self) -> Result<()> {
        let token = &self.tokens[self.pos];
        self.builder.token(token.kind, token.text.clone())?;
        self.pos += 1;
        Ok(())
    }

    fn bump_trivia(&mut self) -> Result<()> {
        while matches!(
            self.current(),
            Some(SyntaxKind::Whitespace) | Some(SyntaxKind::Comment)
        ) {
            self.bump()?;
        }
        Ok(())
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.current() == Some(SyntaxKind::Keyword) && self.current_text() == Some(word)
    }

    /// Next non-trivia token text starting at the current position.
    fn next_meaningful_is_keyword(&self, word: &str) -> bool {
        let mut offset = 1;
        while let Some(kind) = self.kind_at(offset) {
            if kind.is_trivia() {
                offset += 1;
                continue;
            }
            return kind == SyntaxKind::Keyword
                && self.tokens[self.pos + offset].text == word;
        }
        false
    }

    fn parse_file(&mut self) -> Result<()> {
        while self.current().is_some() {
            self.parse_element()?;
        }
        Ok(())
    }

    /// Parse one construct, or fall back to emitting a single token.
    fn parse_element(&mut self) -> Result<()> {
        match self.current() {
            Some(SyntaxKind::Keyword) if self.at_keyword("enum") && self.next_meaningful_is_keyword("class") => {
                self.parse_enum_class()
            }
            Some(SyntaxKind::Keyword) if self.at_keyword("fun") => self.parse_function(),
            Some(SyntaxKind::Identifier) if self.kind_at(1) == Some(SyntaxKind::LParen) => {
                self.parse_call()
            }
            Some(SyntaxKind::Quote) => self.parse_string_template(),
            Some(SyntaxKind::LBrace) => self.parse_block(),
            Some(_) => self.bump(),
            None => Ok(()),
        }
    }

    fn parse_call(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::CallExpr)?;
        self.bump()?; // callee identifier
        self.parse_value_argument_list()?;
        self.builder.finish_node()
    }

    fn parse_value_argument_list(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::ValueArgumentList)?;
        self.bump()?; // '('
        loop {
            match self.current() {
                None => break,
                Some(SyntaxKind::RParen) => {
                    self.bump()?;
                    break;
                }
                Some(SyntaxKind::Whitespace)
                | Some(SyntaxKind::Comment)
                | Some(SyntaxKind::Comma) => self.bump()?,
                Some(_) => self.parse_value_argument()?,
            }
        }
        self.builder.finish_node()
    }

    fn parse_value_argument(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::ValueArgument)?;
        let mut paren_depth = 0usize;
        loop {
            match self.current() {
                None => break,
                Some(SyntaxKind::Comma) if paren_depth == 0 => break,
                Some(SyntaxKind::RParen) if paren_depth == 0 => break,
                Some(SyntaxKind::LParen) => {
                    paren_depth += 1;
                    self.bump()?;
                }
                Some(SyntaxKind::RParen) => {
                    paren_depth -= 1;
                    self.bump()?;
                }
                Some(_) => self.parse_element()?,
            }
        }
        self.builder.finish_node()
    }

    fn parse_enum_class(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::EnumClass)?;
        self.bump()?; // 'enum'
        self.bump_trivia()?;
        if self.at_keyword("class") {
            self.bump()?;
        }
        self.bump_trivia()?;
        if self.current() == Some(SyntaxKind::Identifier) {
            self.bump()?;
        }
        self.bump_trivia()?;
        if self.current() == Some(SyntaxKind::LBrace) {
            self.parse_enum_body()?;
        }
        self.builder.finish_node()
    }

    fn parse_enum_body(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::Block)?;
        self.bump()?; // '{'
        loop {
            match self.current() {
                None => break,
                Some(SyntaxKind::RBrace) => {
                    self.bump()?;
                    break;
                }
                Some(SyntaxKind::Whitespace)
                | Some(SyntaxKind::Comment)
                | Some(SyntaxKind::Comma)
                | Some(SyntaxKind::Semicolon) => self.bump()?,
                Some(SyntaxKind::Identifier) => self.parse_enum_entry()?,
                Some(_) => self.parse_element()?,
            }
        }
        self.builder.finish_node()
    }

    fn parse_enum_entry(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::EnumEntry)?;
        self.bump()?; // entry name
        if self.current() == Some(SyntaxKind::LParen) {
            self.parse_value_argument_list()?;
        }
        self.builder.finish_node()
    }

    fn parse_function(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::FunctionDecl)?;
        self.bump()?; // 'fun'
        self.bump_trivia()?;
        if self.current() == Some(SyntaxKind::Identifier) {
            self.bump()?;
        }
        if self.current() == Some(SyntaxKind::LParen) {
            self.parse_value_argument_list()?;
        }
        self.bump_trivia()?;
        if self.current() == Some(SyntaxKind::LBrace) {
            self.parse_block()?;
        }
        self.builder.finish_node()
    }

    fn parse_block(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::Block)?;
        self.bump()?; // '{'
        loop {
            match self.current() {
                None => break,
                Some(SyntaxKind::RBrace) => {
                    self.bump()?;
                    break;
                }
                Some(_) => self.parse_element()?,
            }
        }
        self.builder.finish_node()
    }

    fn parse_string_template(&mut self) -> Result<()> {
        self.builder.start_node(SyntaxKind::StringTemplate)?;
        self.bump()?; // opening quote
        loop {
            match self.current() {
                None => break,
                Some(SyntaxKind::Quote) => {
                    self.bump()?;
                    break;
                }
                Some(SyntaxKind::TemplateDollar) => {
                    self.builder.start_node(SyntaxKind::TemplateEntry)?;
                    self.bump()?; // '$'
                    if self.current() == Some(SyntaxKind::Identifier) {
                        self.bump()?;
                    }
                    self.builder.finish_node()?;
                }
                Some(SyntaxKind::TemplateOpen) => {
                    self.builder.start_node(SyntaxKind::TemplateEntry)?;
                    self.bump()?; // '${'
                    loop {
                        match self.current() {
                            None => break,
                            Some(SyntaxKind::TemplateClose) => {
                                self.bump()?;
                                break;
                            }
                            Some(_) => self.parse_element()?,
                        }
                    }
                    self.builder.finish_node()?;
                }
                Some(_) => self.bump()?,
            }
        }
        self.builder.finish_node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::tree::NodeId;

    fn find_kind(tree: &SyntaxTree, kind: SyntaxKind) -> Option<NodeId> {
        let mut current = Some(tree.root());
        while let Some(node) = current {
            if tree.kind(node) == kind {
                return Some(node);
            }
            current = tree.next_preorder(node, tree.root());
        }
        None
    }

    #[test]
    fn round_trips_arbitrary_source() {
        let sources = [
            "x(1,  3)",
            "fun main() {\n    print(\"hello $who\")\n}\n",
            "enum class E { FOO, FOO_BAR, _FOO }",
            "val a = 12345678\n",
            "unmatched ) brace } here",
            "a..b ?: c // trailing\n/* block */",
        ];
        for source in sources {
            let tree = parse_source(source).unwrap();
            assert_eq!(tree.text(), source, "round trip failed for {source:?}");
        }
    }

    #[test]
    fn calls_wrap_arguments_in_composites() {
        let tree = parse_source("x(1,  3)").unwrap();
        let call = find_kind(&tree, SyntaxKind::CallExpr).unwrap();
        assert_eq!(tree.text_of(call), "x(1,  3)");
        let list = find_kind(&tree, SyntaxKind::ValueArgumentList).unwrap();
        let arg_kinds: Vec<_> = tree
            .children(list)
            .iter()
            .map(|&c| tree.kind(c))
            .collect();
        assert_eq!(
            arg_kinds,
            vec![
                SyntaxKind::LParen,
                SyntaxKind::ValueArgument,
                SyntaxKind::Comma,
                SyntaxKind::Whitespace,
                SyntaxKind::ValueArgument,
                SyntaxKind::RParen,
            ]
        );
    }

    #[test]
    fn enum_entries_are_wrapped() {
        let tree = parse_source("enum class E { FOO, FOO_BAR, _FOO }").unwrap();
        let mut names = Vec::new();
        let mut current = Some(tree.root());
        while let Some(node) = current {
            if tree.kind(node) == SyntaxKind::EnumEntry {
                names.push(tree.text_of(node));
            }
            current = tree.next_preorder(node, tree.root());
        }
        assert_eq!(names, vec!["FOO", "FOO_BAR", "_FOO"]);
    }

    #[test]
    fn template_entries_nest_inside_string_templates() {
        let tree = parse_source("\"sum: ${ add(1, 2) }\"").unwrap();
        let template = find_kind(&tree, SyntaxKind::StringTemplate).unwrap();
        let entry = find_kind(&tree, SyntaxKind::TemplateEntry).unwrap();
        assert_eq!(tree.text_of(entry), "${ add(1, 2) }");
        assert!(tree.parent(entry) == Some(template));
        // The nested call is structured, not flat tokens.
        assert!(find_kind(&tree, SyntaxKind::CallExpr).is_some());
    }

    #[test]
    fn parse_failures_carry_position() {
        let err = parse_source("val s = \"oops").unwrap_err();
        match err {
            StiltError::ParseError { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 9);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn fresh_trees_report_generation_zero() {
        let tree = parse_source("fun f() {}").unwrap();
        assert_eq!(tree.edit_generation(), 0);
    }
}
