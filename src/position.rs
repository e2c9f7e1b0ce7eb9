// ABOUTME: Source position tracking for diagnostics

use std::rc::Rc;

/// A single point in a source file, immutable once attached to a token.
///
/// `idx` is a zero-based character offset into `source`. `line` is
/// zero-based. `row_offset` is the column width of the current source row,
/// used to place the caret under a diagnostic.
#[derive(Debug, Clone)]
pub struct Position {
    pub idx: usize,
    pub line: usize,
    pub col: usize,
    pub file_name: Rc<str>,
    pub source: Rc<str>,
    pub row_offset: usize,
}

impl Position {
    pub fn new(file_name: Rc<str>, source: Rc<str>) -> Self {
        Position {
            idx: 0,
            line: 0,
            col: 0,
            file_name,
            source,
            row_offset: 0,
        }
    }

    /// Advances this position past `current_char`, the character it currently
    /// points at. Newlines reset the column and row offset and bump the line.
    pub fn advance(&mut self, current_char: Option<char>) -> &mut Self {
        self.idx += 1;
        self.col += 1;
        self.row_offset += 1;

        if current_char == Some('\n') {
            self.line += 1;
            self.col = 0;
            self.row_offset = 0;
        }

        self
    }

    /// The current source row, for diagnostic rendering.
    pub fn row_text(&self) -> &str {
        self.source.split('\n').nth(self.line).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(source: &str) -> Position {
        Position::new(Rc::from("test"), Rc::from(source))
    }

    #[test]
    fn advance_tracks_column_and_offset() {
        let mut p = pos("ab");
        p.advance(Some('a'));
        assert_eq!(p.idx, 1);
        assert_eq!(p.col, 1);
        assert_eq!(p.row_offset, 1);
    }

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut p = pos("a\nb");
        p.advance(Some('a'));
        p.advance(Some('\n'));
        assert_eq!(p.line, 1);
        assert_eq!(p.col, 0);
        assert_eq!(p.row_offset, 0);
    }

    #[test]
    fn row_text_finds_current_line() {
        let p = pos("first\nsecond\nthird");
        let mut q = p.clone();
        q.line = 1;
        assert_eq!(q.row_text(), "second");
    }
}
