//! Reference lexer
//!
//! Produces a flat token stream covering the entire input. Every character of
//! the source lands in exactly one token, including whitespace and comments,
//! which is what makes the tree built from these tokens lossless.
//!
//! String templates are lexed structurally: the delimiters, literal segments
//! and interpolation markers come out as separate tokens so the parser can
//! wrap entries into composites without re-scanning text.

use crate::cst::SyntaxKind;

/// One lexed token: a kind plus the exact literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken {
    pub kind: SyntaxKind,
    pub text: String,
}

impl LexedToken {
    fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Lexing failure, positioned by byte offset into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub offset: usize,
    pub message: String,
}

const KEYWORDS: &[&str] = &["fun", "enum", "class", "object", "val", "var", "when"];

/// Lex the full source into tokens.
pub fn lex(source: &str) -> Result<Vec<LexedToken>, LexError> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut tokens = Vec::new();
    while !lexer.at_eof() {
        lexer.scan_one(&mut tokens)?;
    }
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
        &self.source[start..self.pos]
    }

    fn scan_one(&mut self, out: &mut Vec<LexedToken>) -> Result<(), LexError> {
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(()),
        };
        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                let text = self.take_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                out.push(LexedToken::new(SyntaxKind::Whitespace, text));
            }
            '/' if self.peek_second() == Some('/') => {
                let text = self.take_while(|c| c != '\n');
                out.push(LexedToken::new(SyntaxKind::Comment, text));
            }
            '/' if self.peek_second() == Some('*') => {
                let start = self.pos;
                self.bump();
                self.bump();
                while !self.at_eof() {
                    if self.peek() == Some('*') && self.peek_second() == Some('/') {
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
                out.push(LexedToken::new(
                    SyntaxKind::Comment,
                    &self.source[start..self.pos],
                ));
            }
            '"' => self.scan_string(out)?,
            _ if is_identifier_start(ch) => {
                let text = self.take_while(is_identifier_continue);
                let kind = if KEYWORDS.contains(&text) {
                    SyntaxKind::Keyword
                } else {
                    SyntaxKind::Identifier
                };
                out.push(LexedToken::new(kind, text));
            }
            _ if ch.is_ascii_digit() => {
                let text = self.take_while(|c| c.is_ascii_digit() || c == '_');
                out.push(LexedToken::new(SyntaxKind::IntegerLiteral, text));
            }
            _ => {
                self.bump();
                let kind = match ch {
                    '(' => SyntaxKind::LParen,
                    ')' => SyntaxKind::RParen,
                    '{' => SyntaxKind::LBrace,
                    '}' => SyntaxKind::RBrace,
                    ',' => SyntaxKind::Comma,
                    '.' => SyntaxKind::Dot,
                    ':' => SyntaxKind::Colon,
                    ';' => SyntaxKind::Semicolon,
                    _ => SyntaxKind::Operator,
                };
                out.push(LexedToken::new(kind, ch.to_string()));
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, out: &mut Vec<LexedToken>) -> Result<(), LexError> {
        let open_offset = self.pos;
        self.bump();
        out.push(LexedToken::new(SyntaxKind::Quote, "\""));
        let mut segment = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        offset: open_offset,
                        message: "unterminated string template".to_string(),
                    });
                }
                Some('"') => {
                    flush_segment(&mut segment, out);
                    self.bump();
                    out.push(LexedToken::new(SyntaxKind::Quote, "\""));
                    return Ok(());
                }
                Some('\\') => {
                    segment.push('\\');
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        segment.push(escaped);
                    }
                }
                Some('$') => {
                    if self.peek_second() == Some('{') {
                        flush_segment(&mut segment, out);
                        self.bump();
                        self.bump();
                        out.push(LexedToken::new(SyntaxKind::TemplateOpen, "${"));
                        self.scan_template_expression(out, open_offset)?;
                    } else if self.peek_second().is_some_and(is_identifier_start) {
                        flush_segment(&mut segment, out);
                        self.bump();
                        out.push(LexedToken::new(SyntaxKind::TemplateDollar, "$"));
                        let name = self.take_while(is_identifier_continue);
                        out.push(LexedToken::new(SyntaxKind::Identifier, name));
                    } else {
                        segment.push('$');
                        self.bump();
                    }
                }
                Some(other) => {
                    segment.push(other);
                    self.bump();
                }
            }
        }
    }

    /// Tokens between `${` and its matching `}`; plain braces nest.
    fn scan_template_expression(
        &mut self,
        out: &mut Vec<LexedToken>,
        open_offset: usize,
    ) -> Result<(), LexError> {
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                return Err(LexError {
                    offset: open_offset,
                    message: "unterminated template entry".to_string(),
                });
            }
            let before = out.len();
            self.scan_one(out)?;
            let mut index = before;
            while index < out.len() {
                match out[index].kind {
                    SyntaxKind::LBrace => depth += 1,
                    SyntaxKind::RBrace if depth > 0 => depth -= 1,
                    SyntaxKind::RBrace => {
                        // This brace closes the entry; retag it.
                        out[index].kind = SyntaxKind::TemplateClose;
                        return Ok(());
                    }
                    _ => {}
                }
                index += 1;
            }
        }
    }
}

fn flush_segment(segment: &mut String, out: &mut Vec<LexedToken>) {
    if !segment.is_empty() {
        out.push(LexedToken::new(
            SyntaxKind::StringText,
            std::mem::take(segment),
        ));
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(tokens: &[LexedToken]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn every_character_lands_in_a_token() {
        let source = "fun main() {\n    // greet\n    print(\"hi $name, ${1 + 2}\")\n}\n";
        let tokens = lex(source).unwrap();
        assert_eq!(concat(&tokens), source);
    }

    #[test]
    fn whitespace_runs_are_single_tokens() {
        let tokens = lex("a  \t b").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Whitespace,
                SyntaxKind::Identifier
            ]
        );
        assert_eq!(tokens[1].text, "  \t ");
    }

    #[test]
    fn keywords_are_tagged() {
        let tokens = lex("enum class E").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::Keyword);
        assert_eq!(tokens[2].kind, SyntaxKind::Keyword);
        assert_eq!(tokens[4].kind, SyntaxKind::Identifier);
    }

    #[test]
    fn string_templates_lex_structurally() {
        let tokens = lex("\"a ${ x } b $y\"").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Quote,
                SyntaxKind::StringText,
                SyntaxKind::TemplateOpen,
                SyntaxKind::Whitespace,
                SyntaxKind::Identifier,
                SyntaxKind::Whitespace,
                SyntaxKind::TemplateClose,
                SyntaxKind::StringText,
                SyntaxKind::TemplateDollar,
                SyntaxKind::Identifier,
                SyntaxKind::Quote,
            ]
        );
        assert_eq!(concat(&tokens), "\"a ${ x } b $y\"");
    }

    #[test]
    fn escaped_dollars_stay_literal() {
        let tokens = lex("\"\\$x\"").unwrap();
        assert_eq!(tokens[1].kind, SyntaxKind::StringText);
        assert_eq!(tokens[1].text, "\\$x");
    }

    #[test]
    fn unterminated_strings_are_errors() {
        let err = lex("x(\"abc").unwrap_err();
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn multibyte_identifiers_lex_as_one_token() {
        let tokens = lex("héllo wörld").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::Identifier);
        assert_eq!(tokens[0].text, "héllo");
        assert_eq!(tokens[2].text, "wörld");
    }
}
