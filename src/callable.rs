// ABOUTME: Callable trait for user-defined and native functions

use crate::ast::FunctionDecl;
use crate::env::Environment;
use crate::error::GlintError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Callable: std::fmt::Debug {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, GlintError>;
    fn name(&self) -> &str;
    fn is_native(&self) -> bool {
        false
    }
}

/// A user-defined function. Calls are not lexical closures: a call's
/// environment parent is always the interpreter's global scope, matching
/// the evaluator's non-closure function semantics.
#[derive(Debug)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>) -> Self {
        Function { declaration }
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, GlintError> {
        let env = Environment::with_parent(interpreter.globals());
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            let _ = env.define(param.lexeme(), arg);
        }
        interpreter.call_function_body(&self.declaration.body, env)
    }

    fn name(&self) -> &str {
        self.declaration.name.lexeme_ref()
    }
}

type NativeFn = fn(&[Value]) -> Result<Value, GlintError>;

/// A callable implemented directly in the host language.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, GlintError> {
        (self.func)(&arguments)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn is_native(&self) -> bool {
        true
    }
}

pub fn clock(_arguments: &[Value]) -> Result<Value, GlintError> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Number(seconds))
}
