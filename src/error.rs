// ABOUTME: Error types for lexing, parsing, and evaluation failures

use crate::position::Position;
use thiserror::Error;

// ===== Detail strings that must match verbatim for diagnostic compatibility =====

pub const DIVISION_BY_ZERO: &str = "Division by zero";
pub const ARITHMETIC_ONLY_NUMBERS: &str = "Can apply arithmetic operations only to numbers";
pub const UNTERMINATED_STRING: &str = "Unterminated string";
pub const UNEXPECTED_TOKEN: &str = "Unexpected token";
pub const INVALID_ASSIGNMENT_TARGET: &str = "Invalid assignment target";
pub const EXPECTED_SEMI_AFTER_EXPR: &str = "Expected ';' after expression";
pub const EXPECTED_VARIABLE_NAME: &str = "Expected variable name";
pub const EXPECTED_NUMBER: &str = "Expected number";
pub const EXPECTED_LPAREN: &str = "Expected '('";
pub const EXPECTED_RPAREN: &str = "Expected ')'";
pub const EXPECTED_LBRACE: &str = "Expected '{'";
pub const EXPECTED_RBRACE: &str = "Expected '}'";
pub const TRAILING_DOT: &str = "Trailing dot";
pub const LEADING_DOT: &str = "Leading dot";
pub const TOO_MANY_DOTS: &str = "Too many dots";
pub const BINARY_OPS_TYPE_ERROR: &str = "Can apply binary operations only to numbers, strings or booleans.\nThe operands must be of the same type.";
pub const CALLS_RESTRICTION: &str = "Can only call functions and classes";
pub const TOO_MANY_ARGUMENTS: &str = "Can't have more than 255 arguments";
pub const EXPECTED_FUNCTION_NAME: &str = "Expected function name";
pub const EXPECTED_PARAMETER_NAME: &str = "Expected parameter name";
pub const EXPECTED_SEMI: &str = "Expected ';'";
pub const RETURN_OUTSIDE_FUNCTION: &str = "Can't return from top-level code";

/// The three diagnostic kinds the pipeline can raise, each carrying the
/// source span it occurred at plus a human-readable detail string. Matches
/// the stable kind names of the driver's diagnostic format.
#[derive(Error, Debug, Clone)]
pub enum GlintError {
    #[error("Illegal character: {detail}")]
    IllegalChar {
        pos_start: Position,
        pos_end: Position,
        detail: String,
    },
    #[error("Invalid syntax: {detail}")]
    InvalidSyntax {
        pos_start: Position,
        pos_end: Position,
        detail: String,
    },
    #[error("Runtime Error: {detail}")]
    Runtime {
        pos_start: Position,
        pos_end: Position,
        detail: String,
    },
}

impl GlintError {
    pub fn illegal_char(pos_start: Position, pos_end: Position, detail: impl Into<String>) -> Self {
        GlintError::IllegalChar {
            pos_start,
            pos_end,
            detail: detail.into(),
        }
    }

    pub fn invalid_syntax(
        pos_start: Position,
        pos_end: Position,
        detail: impl Into<String>,
    ) -> Self {
        GlintError::InvalidSyntax {
            pos_start,
            pos_end,
            detail: detail.into(),
        }
    }

    pub fn runtime(pos_start: Position, pos_end: Position, detail: impl Into<String>) -> Self {
        GlintError::Runtime {
            pos_start,
            pos_end,
            detail: detail.into(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            GlintError::IllegalChar { .. } => "Illegal character",
            GlintError::InvalidSyntax { .. } => "Invalid syntax",
            GlintError::Runtime { .. } => "Runtime Error",
        }
    }

    fn parts(&self) -> (&Position, &str) {
        match self {
            GlintError::IllegalChar {
                pos_start, detail, ..
            } => (pos_start, detail),
            GlintError::InvalidSyntax {
                pos_start, detail, ..
            } => (pos_start, detail),
            GlintError::Runtime {
                pos_start, detail, ..
            } => (pos_start, detail),
        }
    }

    /// Renders the stable multi-line diagnostic:
    /// ```text
    /// <ErrorKind>: <detail>
    ///
    ///    <line> | <source row>
    ///                         ^
    /// ```
    /// with the caret aligned under `pos_start.row_offset`.
    pub fn render(&self) -> String {
        let (pos_start, detail) = self.parts();
        let prefix = format!("   {} | ", pos_start.line + 1);
        let row = pos_start.row_text();
        let caret_pad = " ".repeat(prefix.len() + pos_start.row_offset);
        format!("{}: {}\n\n{}{}\n{}^", self.kind_name(), detail, prefix, row, caret_pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn pos(line: usize, row_offset: usize) -> Position {
        Position {
            idx: 0,
            line,
            col: row_offset,
            file_name: Rc::from("test"),
            source: Rc::from("1 + ;"),
            row_offset,
        }
    }

    #[test]
    fn render_places_caret_under_row_offset() {
        let err = GlintError::runtime(pos(0, 4), pos(0, 5), DIVISION_BY_ZERO);
        let rendered = err.render();
        assert!(rendered.starts_with("Runtime Error: Division by zero"));
        let caret_line = rendered.lines().last().unwrap();
        assert!(caret_line.ends_with('^'));
    }

    #[test]
    fn kind_name_matches_spec_strings() {
        assert_eq!(
            GlintError::illegal_char(pos(0, 0), pos(0, 0), "'@'").kind_name(),
            "Illegal character"
        );
        assert_eq!(
            GlintError::invalid_syntax(pos(0, 0), pos(0, 0), UNEXPECTED_TOKEN).kind_name(),
            "Invalid syntax"
        );
    }
}
