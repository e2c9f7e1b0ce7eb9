// ABOUTME: Tree-walking evaluator executing the AST inside a scope chain

use crate::ast::{Expr, Stmt};
use crate::callable::{self, Function, NativeFunction};
use crate::env::Environment;
use crate::error::{self, GlintError};
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// An in-memory sink for `print` output, shared via `Rc` so a test can keep
/// a handle to read back what a moved-out `Interpreter` wrote.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes written so far, decoded as UTF-8 (lossily, though `print`
    /// never writes invalid UTF-8).
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Non-local control transfer raised by a `return` statement. Distinct from
/// `GlintError` so the evaluator can tell "the program failed" apart from
/// "a function is handing back its result".
enum Unwind {
    Error(GlintError),
    Return(Value),
}

impl From<GlintError> for Unwind {
    fn from(err: GlintError) -> Self {
        Unwind::Error(err)
    }
}

type ExecResult = Result<(), Unwind>;

pub struct Interpreter {
    globals: Rc<Environment>,
    env: Rc<Environment>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// A fresh interpreter printing to real stdout, for one-shot runs
    /// (file mode, the free `run` function).
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// A fresh interpreter printing into `output` instead of stdout, so a
    /// whole run's `print` output can be captured and asserted on.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        let _ = globals.define(
            "clock".to_string(),
            Value::Callable(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: callable::clock,
            })),
        );
        Interpreter {
            env: globals.clone(),
            globals,
            output,
        }
    }

    pub fn globals(&self) -> Rc<Environment> {
        self.globals.clone()
    }

    /// Runs a whole program: every top-level declaration in order. A
    /// trailing expression statement's value is returned; effectful
    /// programs return `Value::Nil`.
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<Value, GlintError> {
        let mut result = Value::Nil;
        for stmt in stmts {
            if let Stmt::Expression(expr) = stmt {
                result = self.eval(expr)?;
                continue;
            }
            result = Value::Nil;
            match self.exec_stmt(stmt) {
                Ok(()) => {}
                Err(Unwind::Error(err)) => return Err(err),
                Err(Unwind::Return(_)) => {
                    let (pos_start, pos_end) = stmt_anchor(stmt);
                    return Err(GlintError::runtime(pos_start, pos_end, error::RETURN_OUTSIDE_FUNCTION));
                }
            }
        }
        Ok(result)
    }

    /// Invoked by `Function::call`: executes a function body in its fresh
    /// call environment, translating the `return` signal into the call's
    /// result value.
    pub fn call_function_body(&mut self, body: &[Stmt], env: Rc<Environment>) -> Result<Value, GlintError> {
        let previous = std::mem::replace(&mut self.env, env);
        let result = (|| {
            for stmt in body {
                match self.exec_stmt(stmt) {
                    Ok(()) => {}
                    Err(Unwind::Error(err)) => return Err(err),
                    Err(Unwind::Return(value)) => return Ok(value),
                }
            }
            Ok(Value::Nil)
        })();
        self.env = previous;
        result
    }

    // ===== statements =====

    fn exec_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Print(expr) => {
                let value = self.eval(expr)?;
                let _ = writeln!(self.output, "{value}");
                Ok(())
            }
            Stmt::Expression(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                self.env
                    .define(name.lexeme(), value)
                    .map_err(|detail| GlintError::runtime(name.pos_start.clone(), name.pos_end.clone(), detail))?;
                Ok(())
            }
            Stmt::Block(stmts) => {
                let child = Environment::with_parent(self.env.clone());
                self.exec_block(stmts, child)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.eval(condition)?.is_truthy() {
                    self.exec_stmt(body)?;
                }
                Ok(())
            }
            Stmt::Function(decl) => {
                let function = Value::Callable(Rc::new(Function::new(decl.clone())));
                self.env
                    .define(decl.name.lexeme(), function)
                    .map_err(|detail| {
                        GlintError::runtime(decl.name.pos_start.clone(), decl.name.pos_end.clone(), detail)
                    })?;
                Ok(())
            }
            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
        }
    }

    /// Executes `stmts` inside `env`, restoring the previous environment
    /// before returning regardless of outcome.
    fn exec_block(&mut self, stmts: &[Stmt], env: Rc<Environment>) -> ExecResult {
        let previous = std::mem::replace(&mut self.env, env);
        let result = stmts.iter().try_for_each(|s| self.exec_stmt(s));
        self.env = previous;
        result
    }

    // ===== expressions =====

    fn eval(&mut self, expr: &Expr) -> Result<Value, GlintError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Identifier(name) => self
                .env
                .get(name.lexeme_ref())
                .map_err(|detail| GlintError::runtime(name.pos_start.clone(), name.pos_end.clone(), detail)),
            Expr::Unary { op, operand } => self.eval_unary(op, operand),
            Expr::Binary { left, op, right } => self.eval_binary(left, op, right),
            Expr::Logical { left, op, right } => self.eval_logical(left, op, right),
            Expr::Assign { target, op, value } => {
                let value = self.eval(value)?;
                self.env
                    .assign(target.lexeme_ref(), value.clone())
                    .map_err(|detail| GlintError::runtime(op.pos_start.clone(), op.pos_end.clone(), detail))?;
                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.eval_call(callee, paren, arguments),
        }
    }

    fn eval_unary(&mut self, op: &Token, operand: &Expr) -> Result<Value, GlintError> {
        let value = self.eval(operand)?;
        match op.kind {
            TokenKind::Minus => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(GlintError::runtime(
                    op.pos_start.clone(),
                    op.pos_end.clone(),
                    error::ARITHMETIC_ONLY_NUMBERS,
                )),
            },
            TokenKind::Bang => Ok(Value::Boolean(!value.is_truthy())),
            _ => unreachable!("unary operator token must be '-' or '!'"),
        }
    }

    fn eval_logical(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, GlintError> {
        let left_value = self.eval(left)?;
        let is_or = op.matches(TokenKind::Keyword, "or");
        if is_or && left_value.is_truthy() {
            return Ok(left_value);
        }
        if !is_or && !left_value.is_truthy() {
            return Ok(left_value);
        }
        self.eval(right)
    }

    fn eval_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, GlintError> {
        let left_value = self.eval(left)?;
        let right_value = self.eval(right)?;
        let span = || (op.pos_start.clone(), op.pos_end.clone());

        match op.kind {
            TokenKind::Plus => match (&left_value, &right_value) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
                _ => {
                    let (s, e) = span();
                    Err(GlintError::runtime(s, e, error::BINARY_OPS_TYPE_ERROR))
                }
            },
            TokenKind::Minus | TokenKind::Mul | TokenKind::Div => {
                let (Value::Number(a), Value::Number(b)) = (&left_value, &right_value) else {
                    let (s, e) = span();
                    return Err(GlintError::runtime(s, e, error::ARITHMETIC_ONLY_NUMBERS));
                };
                match op.kind {
                    TokenKind::Minus => Ok(Value::Number(a - b)),
                    TokenKind::Mul => Ok(Value::Number(a * b)),
                    TokenKind::Div => {
                        if *b == 0.0 {
                            let (s, e) = span();
                            Err(GlintError::runtime(s, e, error::DIVISION_BY_ZERO))
                        } else {
                            Ok(Value::Number(a / b))
                        }
                    }
                    _ => unreachable!(),
                }
            }
            TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
                let (Value::Number(a), Value::Number(b)) = (&left_value, &right_value) else {
                    let (s, e) = span();
                    return Err(GlintError::runtime(s, e, error::ARITHMETIC_ONLY_NUMBERS));
                };
                let result = match op.kind {
                    TokenKind::Less => a < b,
                    TokenKind::LessEqual => a <= b,
                    TokenKind::Greater => a > b,
                    TokenKind::GreaterEqual => a >= b,
                    _ => unreachable!(),
                };
                Ok(Value::Boolean(result))
            }
            TokenKind::EqualEqual => Ok(Value::Boolean(values_equal(&left_value, &right_value))),
            TokenKind::BangEqual => Ok(Value::Boolean(!values_equal(&left_value, &right_value))),
            _ => unreachable!("binary operator token must be an arithmetic, comparison, or equality op"),
        }
    }

    fn eval_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr]) -> Result<Value, GlintError> {
        let callee_value = self.eval(callee)?;
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.eval(arg)?);
        }

        let Value::Callable(callable) = callee_value else {
            return Err(GlintError::runtime(
                paren.pos_start.clone(),
                paren.pos_end.clone(),
                error::CALLS_RESTRICTION,
            ));
        };

        if args.len() != callable.arity() {
            return Err(GlintError::runtime(
                paren.pos_start.clone(),
                paren.pos_end.clone(),
                format!("Expected {} arguments, but got {}.", callable.arity(), args.len()),
            ));
        }

        callable.call(self, args)
    }
}

/// `==`/`!=` between two values of the same kind compares by value; any
/// other combination of kinds returns `false` rather than erroring.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Nil, Value::Nil) => true,
        _ => false,
    }
}

fn stmt_anchor(stmt: &Stmt) -> (crate::position::Position, crate::position::Position) {
    fn expr_anchor(expr: &Expr) -> Option<(crate::position::Position, crate::position::Position)> {
        match expr {
            Expr::Identifier(tok) => Some((tok.pos_start.clone(), tok.pos_end.clone())),
            Expr::Unary { op, .. } | Expr::Binary { op, .. } | Expr::Logical { op, .. } | Expr::Assign { op, .. } => {
                Some((op.pos_start.clone(), op.pos_end.clone()))
            }
            Expr::Call { paren, .. } => Some((paren.pos_start.clone(), paren.pos_end.clone())),
            _ => None,
        }
    }

    match stmt {
        Stmt::Return { keyword, .. } => (keyword.pos_start.clone(), keyword.pos_end.clone()),
        Stmt::Print(e) | Stmt::Expression(e) => expr_anchor(e).unwrap_or_else(zero_span),
        Stmt::Var { name, .. } => (name.pos_start.clone(), name.pos_end.clone()),
        Stmt::Function(decl) => (decl.name.pos_start.clone(), decl.name.pos_end.clone()),
        Stmt::Block(stmts) => stmts.first().map(stmt_anchor).unwrap_or_else(zero_span),
        Stmt::If { then_branch, .. } => stmt_anchor(then_branch),
        Stmt::While { body, .. } => stmt_anchor(body),
    }
}

fn zero_span() -> (crate::position::Position, crate::position::Position) {
    let pos = crate::position::Position::new(Rc::from(""), Rc::from(""));
    (pos.clone(), pos)
}

/// Lexes, parses, and runs a whole program from source text. Returns the
/// trailing expression statement's value, or `Value::Nil` for effectful
/// programs. `print` output goes to stdout; use `run_capturing` to assert
/// on it instead.
pub fn run(file_name: &str, source: &str) -> Result<Value, GlintError> {
    let tokens = crate::lexer::Lexer::new(file_name, source).tokenize()?;
    let stmts = crate::parser::Parser::new(tokens).parse()?;
    Interpreter::new().run(&stmts)
}

/// Like `run`, but captures every `print` into a buffer instead of writing
/// to stdout, returning it alongside the program's result value.
pub fn run_capturing(file_name: &str, source: &str) -> Result<(Value, String), GlintError> {
    let tokens = crate::lexer::Lexer::new(file_name, source).tokenize()?;
    let stmts = crate::parser::Parser::new(tokens).parse()?;
    let buffer = SharedBuffer::new();
    let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
    let value = interpreter.run(&stmts)?;
    Ok((value, buffer.contents()))
}
