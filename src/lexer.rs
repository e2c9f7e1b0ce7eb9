// ABOUTME: Character-level lexer turning source text into a token stream

use crate::error::{self, GlintError};
use crate::position::Position;
use crate::token::{Token, TokenKind, TokenValue};
use std::rc::Rc;

const KEYWORDS: &[&str] = &[
    "print", "var", "nil", "true", "false", "if", "else", "and", "or", "while", "for", "fun",
    "return",
];

pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
}

impl Lexer {
    pub fn new(file_name: impl Into<Rc<str>>, source: impl Into<Rc<str>>) -> Self {
        let file_name = file_name.into();
        let source = source.into();
        let chars = source.chars().collect();
        Lexer {
            chars,
            pos: Position::new(file_name, source),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.pos.idx).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos.idx + 1).copied()
    }

    fn advance(&mut self) {
        let c = self.current_char();
        self.pos.advance(c);
    }

    /// Produces every remaining token up to and including `EOF`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, GlintError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    /// Returns the next token, advancing past it. Returns `EOF` indefinitely
    /// once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Token, GlintError> {
        self.skip_whitespace_and_comments();

        let Some(c) = self.current_char() else {
            let pos = self.pos.clone();
            return Ok(Token::single(TokenKind::Eof, TokenValue::None, pos));
        };

        if c.is_ascii_digit() {
            return self.make_number();
        }
        if c == '"' {
            return self.make_string();
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(self.make_identifier());
        }

        let start = self.pos.clone();
        match c {
            '+' => self.single(TokenKind::Plus, "+", start),
            '-' => self.single(TokenKind::Minus, "-", start),
            '*' => self.single(TokenKind::Mul, "*", start),
            '/' => self.single(TokenKind::Div, "/", start),
            '(' => self.single(TokenKind::LParen, "(", start),
            ')' => self.single(TokenKind::RParen, ")", start),
            '{' => self.single(TokenKind::LBrace, "{", start),
            '}' => self.single(TokenKind::RBrace, "}", start),
            ';' => self.single(TokenKind::Semi, ";", start),
            ',' => self.single(TokenKind::Comma, ",", start),
            '=' => self.one_or_two(TokenKind::Eq, "=", '=', TokenKind::EqualEqual, "==", start),
            '!' => self.one_or_two(TokenKind::Bang, "!", '=', TokenKind::BangEqual, "!=", start),
            '<' => self.one_or_two(TokenKind::Less, "<", '=', TokenKind::LessEqual, "<=", start),
            '>' => self.one_or_two(
                TokenKind::Greater,
                ">",
                '=',
                TokenKind::GreaterEqual,
                ">=",
                start,
            ),
            other => {
                self.advance();
                let end = self.pos.clone();
                Err(GlintError::illegal_char(start, end, format!("'{other}'")))
            }
        }
    }

    fn single(
        &mut self,
        kind: TokenKind,
        lexeme: &str,
        start: Position,
    ) -> Result<Token, GlintError> {
        self.advance();
        Ok(Token::single(kind, TokenValue::Text(lexeme.to_string()), start))
    }

    fn one_or_two(
        &mut self,
        one_kind: TokenKind,
        one_lexeme: &str,
        second_char: char,
        two_kind: TokenKind,
        two_lexeme: &str,
        start: Position,
    ) -> Result<Token, GlintError> {
        self.advance();
        if self.current_char() == Some(second_char) {
            self.advance();
            let end = self.pos.clone();
            Ok(Token::spanning(
                two_kind,
                TokenValue::Text(two_lexeme.to_string()),
                start,
                end,
            ))
        } else {
            let end = self.pos.clone();
            Ok(Token::spanning(
                one_kind,
                TokenValue::Text(one_lexeme.to_string()),
                start,
                end,
            ))
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char() {
                Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' => self.advance(),
                Some('/') if self.peek_char() == Some('/') => {
                    while let Some(c) = self.current_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn make_number(&mut self) -> Result<Token, GlintError> {
        let start = self.pos.clone();
        let mut lexeme = String::new();
        let mut dot_count = 0;

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else if c == '.' {
                dot_count += 1;
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let end = self.pos.clone();

        if dot_count > 1 {
            return Err(GlintError::invalid_syntax(start, end, error::TOO_MANY_DOTS));
        }
        if lexeme.starts_with('.') {
            return Err(GlintError::invalid_syntax(start, end, error::LEADING_DOT));
        }
        if lexeme.ends_with('.') {
            return Err(GlintError::invalid_syntax(start, end, error::TRAILING_DOT));
        }

        let value: f64 = lexeme
            .parse()
            .map_err(|_| GlintError::invalid_syntax(start.clone(), end.clone(), error::EXPECTED_NUMBER))?;

        Ok(Token::spanning(
            TokenKind::Number,
            TokenValue::Number(value),
            start,
            end,
        ))
    }

    fn make_string(&mut self) -> Result<Token, GlintError> {
        let start = self.pos.clone();
        self.advance(); // opening quote
        let mut contents = String::new();

        loop {
            match self.current_char() {
                None => {
                    let end = self.pos.clone();
                    return Err(GlintError::invalid_syntax(start, end, error::UNTERMINATED_STRING));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    contents.push(c);
                    self.advance();
                }
            }
        }

        let end = self.pos.clone();
        Ok(Token::spanning(
            TokenKind::String,
            TokenValue::Text(contents),
            start,
            end,
        ))
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut lexeme = String::new();

        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let end = self.pos.clone();
        let kind = if KEYWORDS.contains(&lexeme.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token::spanning(kind, TokenValue::Text(lexeme), start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new("test", source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_arithmetic_expression() {
        let kinds = kinds("1 + 2 * 3;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Mul,
                TokenKind::Number,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_two_char_operators() {
        let kinds = kinds("== != <= >= = < >");
        assert_eq!(
            kinds,
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Eq,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_vs_identifier() {
        let tokens = Lexer::new("test", "var foo").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn skips_line_comments() {
        let kinds = kinds("1 // comment\n2;");
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Semi, TokenKind::Eof]
        );
    }

    #[test]
    fn rejects_trailing_dot() {
        let err = Lexer::new("test", "1.;").tokenize().unwrap_err();
        assert!(matches!(err, GlintError::InvalidSyntax { .. }));
    }

    #[test]
    fn unterminated_string_errors() {
        let err = Lexer::new("test", "\"abc").tokenize().unwrap_err();
        assert!(matches!(err, GlintError::InvalidSyntax { .. }));
    }

    #[test]
    fn illegal_character_errors() {
        let err = Lexer::new("test", "@").tokenize().unwrap_err();
        assert!(matches!(err, GlintError::IllegalChar { .. }));
    }

    #[test]
    fn token_positions_are_well_ordered() {
        for tok in Lexer::new("test", "var x = 12.5;").tokenize().unwrap() {
            assert!(tok.pos_end.idx >= tok.pos_start.idx);
        }
    }
}
