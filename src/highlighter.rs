// ABOUTME: Syntax highlighter for the REPL
// Implements rustyline's Highlighter trait to colorize source as it is typed

use rustyline::Helper;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::collections::HashSet;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_KEYWORD: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)
const COLOR_BRACE: &str = "\x1b[1;34m"; // Bold blue

/// REPL line helper providing syntax-aware color highlighting.
pub struct GlintHelper;

impl GlintHelper {
    pub fn new() -> Self {
        GlintHelper
    }
}

impl Default for GlintHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for GlintHelper {}

impl Completer for GlintHelper {
    type Candidate = String;
}

impl Hinter for GlintHelper {
    type Hint = String;
}

impl Validator for GlintHelper {}

impl Highlighter for GlintHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line, &keywords(), &natives());
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn highlight_line(line: &str, keywords: &HashSet<&'static str>, natives: &HashSet<&'static str>) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '/' if i + 1 < chars.len() && chars[i + 1] == '/' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;
                while i < chars.len() {
                    let c = chars[i];
                    result.push(c);
                    i += 1;
                    if c == '"' {
                        break;
                    }
                }
                result.push_str(COLOR_RESET);
            }

            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num: String = chars[start..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&num);
                result.push_str(COLOR_RESET);
            }

            '(' | ')' | '{' | '}' => {
                result.push_str(COLOR_BRACE);
                result.push(chars[i]);
                result.push_str(COLOR_RESET);
                i += 1;
            }

            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if keywords.contains(word.as_str()) {
                    result.push_str(COLOR_KEYWORD);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else if natives.contains(word.as_str()) {
                    result.push_str(COLOR_BUILTIN);
                    result.push_str(&word);
                    result.push_str(COLOR_RESET);
                } else {
                    result.push_str(&word);
                }
            }

            _ => {
                result.push(chars[i]);
                i += 1;
            }
        }
    }

    result
}

fn keywords() -> HashSet<&'static str> {
    [
        "print", "var", "nil", "true", "false", "if", "else", "and", "or", "while", "for", "fun", "return",
    ]
    .iter()
    .copied()
    .collect()
}

fn natives() -> HashSet<&'static str> {
    ["clock"].iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_highlighting() {
        let highlighted = highlight_line("42", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_NUMBER));
    }

    #[test]
    fn string_highlighting() {
        let highlighted = highlight_line("\"hello\"", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_STRING));
    }

    #[test]
    fn comment_highlighting() {
        let highlighted = highlight_line("// a comment", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_COMMENT));
    }

    #[test]
    fn keyword_highlighting() {
        let highlighted = highlight_line("var x = 1;", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_KEYWORD));
    }

    #[test]
    fn native_function_highlighting() {
        let highlighted = highlight_line("print clock();", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_BUILTIN));
    }

    #[test]
    fn brace_highlighting() {
        let highlighted = highlight_line("fun f() { return 1; }", &keywords(), &natives());
        assert!(highlighted.contains(COLOR_BRACE));
    }
}
