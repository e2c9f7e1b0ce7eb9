// ABOUTME: Recursive-descent parser turning a token stream into an AST

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::error::{self, GlintError};
use crate::token::{Token, TokenKind, TokenValue};
use std::rc::Rc;

const MAX_ARGUMENTS: usize = 255;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, GlintError> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        Ok(stmts)
    }

    // ===== token stream helpers =====

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().matches(TokenKind::Keyword, keyword)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, detail: &str) -> Result<&Token, GlintError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(GlintError::invalid_syntax(tok.pos_start, tok.pos_end, detail))
        }
    }

    // ===== declarations =====

    fn declaration(&mut self) -> Result<Stmt, GlintError> {
        if self.check_keyword("var") {
            self.advance();
            return self.var_declaration();
        }
        if self.check_keyword("fun") {
            self.advance();
            return self.function_declaration();
        }
        self.statement()
    }

    fn var_declaration(&mut self) -> Result<Stmt, GlintError> {
        let name = self
            .expect(TokenKind::Identifier, error::EXPECTED_VARIABLE_NAME)?
            .clone();

        let initializer = if self.match_kind(TokenKind::Eq) {
            Some(self.expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semi, error::EXPECTED_SEMI)?;
        Ok(Stmt::Var { name, initializer })
    }

    fn function_declaration(&mut self) -> Result<Stmt, GlintError> {
        let name = self
            .expect(TokenKind::Identifier, error::EXPECTED_FUNCTION_NAME)?
            .clone();

        self.expect(TokenKind::LParen, error::EXPECTED_LPAREN)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let tok = self.peek().clone();
                    return Err(GlintError::runtime(
                        tok.pos_start,
                        tok.pos_end,
                        error::TOO_MANY_ARGUMENTS,
                    ));
                }
                params.push(
                    self.expect(TokenKind::Identifier, error::EXPECTED_PARAMETER_NAME)?
                        .clone(),
                );
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?;
        self.expect(TokenKind::LBrace, error::EXPECTED_LBRACE)?;
        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    // ===== statements =====

    fn statement(&mut self) -> Result<Stmt, GlintError> {
        if self.match_keyword("print") {
            return self.print_statement();
        }
        if self.match_keyword("if") {
            return self.if_statement();
        }
        if self.match_keyword("while") {
            return self.while_statement();
        }
        if self.match_keyword("for") {
            return self.for_statement();
        }
        if self.match_keyword("return") {
            return self.return_statement();
        }
        if self.match_kind(TokenKind::LBrace) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    fn print_statement(&mut self) -> Result<Stmt, GlintError> {
        let value = self.expression()?;
        self.expect(TokenKind::Semi, error::EXPECTED_SEMI_AFTER_EXPR)?;
        Ok(Stmt::Print(value))
    }

    fn if_statement(&mut self) -> Result<Stmt, GlintError> {
        self.expect(TokenKind::LParen, error::EXPECTED_LPAREN)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_keyword("else") {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, GlintError> {
        self.expect(TokenKind::LParen, error::EXPECTED_LPAREN)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// Desugars into `Block([init, While(cond, Block([body, incr]))])`.
    fn for_statement(&mut self) -> Result<Stmt, GlintError> {
        self.expect(TokenKind::LParen, error::EXPECTED_LPAREN)?;

        let initializer = if self.match_kind(TokenKind::Semi) {
            None
        } else if self.check_keyword("var") {
            self.advance();
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semi) {
            Expr::Boolean(true)
        } else {
            self.expression()?
        };
        self.expect(TokenKind::Semi, error::EXPECTED_SEMI)?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn return_statement(&mut self) -> Result<Stmt, GlintError> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semi, error::EXPECTED_SEMI)?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, GlintError> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        self.expect(TokenKind::RBrace, error::EXPECTED_RBRACE)?;
        Ok(stmts)
    }

    fn expression_statement(&mut self) -> Result<Stmt, GlintError> {
        let expr = self.expression()?;
        self.expect(TokenKind::Semi, error::EXPECTED_SEMI_AFTER_EXPR)?;
        Ok(Stmt::Expression(expr))
    }

    // ===== expressions =====

    fn expression(&mut self) -> Result<Expr, GlintError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, GlintError> {
        let expr = self.logic_or()?;

        if self.check(TokenKind::Eq) {
            let op = self.advance().clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Identifier(target) => Ok(Expr::Assign {
                    target,
                    op,
                    value: Box::new(value),
                }),
                _ => Err(GlintError::invalid_syntax(
                    op.pos_start.clone(),
                    op.pos_end.clone(),
                    error::INVALID_ASSIGNMENT_TARGET,
                )),
            };
        }

        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.logic_and()?;
        while self.check_keyword("or") {
            let op = self.advance().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.equality()?;
        while self.check_keyword("and") {
            let op = self.advance().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.comparison()?;
        while self.check(TokenKind::EqualEqual) || self.check(TokenKind::BangEqual) {
            let op = self.advance().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.term()?;
        while matches!(
            self.peek().kind,
            TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual
        ) {
            let op = self.advance().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.factor()?;
        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            let op = self.advance().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.unary()?;
        while self.check(TokenKind::Mul) || self.check(TokenKind::Div) {
            let op = self.advance().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, GlintError> {
        if self.check(TokenKind::Minus) || self.check(TokenKind::Bang) {
            let op = self.advance().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, GlintError> {
        let mut expr = self.primary()?;
        loop {
            if self.match_kind(TokenKind::LParen) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, GlintError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let tok = self.peek().clone();
                    return Err(GlintError::runtime(
                        tok.pos_start,
                        tok.pos_end,
                        error::TOO_MANY_ARGUMENTS,
                    ));
                }
                arguments.push(self.expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?.clone();
        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr, GlintError> {
        if self.check(TokenKind::Number) {
            let tok = self.advance();
            let TokenValue::Number(n) = tok.value else {
                unreachable!("number token must carry a numeric value")
            };
            return Ok(Expr::Number(n));
        }
        if self.check(TokenKind::String) {
            let tok = self.advance();
            return Ok(Expr::String(tok.lexeme()));
        }
        if self.check_keyword("true") {
            self.advance();
            return Ok(Expr::Boolean(true));
        }
        if self.check_keyword("false") {
            self.advance();
            return Ok(Expr::Boolean(false));
        }
        if self.check_keyword("nil") {
            self.advance();
            return Ok(Expr::Nil);
        }
        if self.check(TokenKind::Identifier) {
            let tok = self.advance().clone();
            return Ok(Expr::Identifier(tok));
        }
        if self.match_kind(TokenKind::LParen) {
            let expr = self.expression()?;
            self.expect(TokenKind::RParen, error::EXPECTED_RPAREN)?;
            return Ok(expr);
        }

        let tok = self.peek().clone();
        Err(GlintError::invalid_syntax(
            tok.pos_start,
            tok.pos_end,
            error::UNEXPECTED_TOKEN,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Lexer::new("test", source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    #[test]
    fn parses_var_declaration_with_initializer() {
        let stmts = parse("var x = 1;");
        assert!(matches!(
            stmts[0],
            Stmt::Var {
                initializer: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn parses_left_associative_term() {
        let stmts = parse("1 - 2 - 3;");
        let Stmt::Expression(Expr::Binary { left, .. }) = &stmts[0] else {
            panic!("expected binary expression statement");
        };
        assert!(matches!(**left, Expr::Binary { .. }));
    }

    #[test]
    fn assignment_requires_identifier_target() {
        let tokens = Lexer::new("test", "1 = 2;").tokenize().unwrap();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert!(matches!(err, GlintError::InvalidSyntax { .. }));
    }

    #[test]
    fn for_loop_desugars_into_block_while_block() {
        let stmts = parse("for (var i = 0; i < 1; i = i + 1) { print i; }");
        let Stmt::Block(outer) = &stmts[0] else {
            panic!("expected outer block");
        };
        assert!(matches!(outer[0], Stmt::Var { .. }));
        assert!(matches!(outer[1], Stmt::While { .. }));
    }

    #[test]
    fn function_declaration_parses_params_and_body() {
        let stmts = parse("fun add(a, b) { return a + b; }");
        let Stmt::Function(decl) = &stmts[0] else {
            panic!("expected function declaration");
        };
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.body.len(), 1);
    }

    #[test]
    fn call_expression_parses_arguments() {
        let stmts = parse("foo(1, 2, 3);");
        let Stmt::Expression(Expr::Call { arguments, .. }) = &stmts[0] else {
            panic!("expected call expression");
        };
        assert_eq!(arguments.len(), 3);
    }
}
