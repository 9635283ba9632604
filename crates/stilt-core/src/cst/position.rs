//! On-demand line/column computation
//!
//! Positions are derived by walking all tokens from the file start and
//! counting newline boundaries, so a query is always consistent with the
//! current tree shape at the moment it is made. Nothing is cached across
//! mutations; the cost is worst-case linear in file size per query, which is
//! acceptable because violations are rare relative to file size.

use crate::cst::tree::{NodeId, SyntaxTree};
use crate::diagnostics::Position;

impl SyntaxTree {
    /// 1-based line/column for a byte offset into the current rendered text.
    ///
    /// Columns are counted in characters. An offset at or past the end of the
    /// text maps to the position just after the last character.
    pub fn position_at_offset(&self, offset: usize) -> Position {
        let mut line = 1usize;
        let mut column = 1usize;
        let mut byte = 0usize;
        for token in self.tokens() {
            let Some(text) = self.token_text(token) else {
                continue;
            };
            for ch in text.chars() {
                if byte >= offset {
                    return Position::new(line, column);
                }
                byte += ch.len_utf8();
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
        }
        Position::new(line, column)
    }

    /// 1-based line/column of the first character at or below a node.
    /// `None` for detached nodes.
    pub fn position_of(&self, id: NodeId) -> Option<Position> {
        let offset = self.start_offset(id)?;
        Some(self.position_at_offset(offset))
    }
}
