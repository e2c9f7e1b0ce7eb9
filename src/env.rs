// ABOUTME: Lexical environment mapping names to values, with scope chaining

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in this scope. Rejects a name already bound in this same
    /// scope; shadowing a name from an enclosing scope is unaffected.
    pub fn define(&self, name: String, value: Value) -> Result<(), String> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(&name) {
            return Err(format!("Variable '{name}' already defined"));
        }
        bindings.insert(name, value);
        Ok(())
    }

    /// Looks up `name`, walking parent scopes recursively.
    pub fn get(&self, name: &str) -> Result<Value, String> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }
        Err(format!("Undefined variable '{name}'"))
    }

    /// Assigns to the nearest scope in which `name` is already bound, walking
    /// parent scopes recursively.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), String> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.assign(name, value);
        }
        Err(format!("Undefined variable '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(42.0)).unwrap();
        assert!(matches!(env.get("x"), Ok(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn undefined_symbol_errors() {
        let env = Environment::new();
        assert!(env.get("undefined").is_err());
    }

    #[test]
    fn redefinition_in_same_scope_errors() {
        let env = Environment::new();
        env.define("a".to_string(), Value::Nil).unwrap();
        let err = env.define("a".to_string(), Value::Number(2.0)).unwrap_err();
        assert_eq!(err, "Variable 'a' already defined");
    }

    #[test]
    fn shadowing_across_scopes_is_legal() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0)).unwrap();

        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Number(100.0)).unwrap();

        assert!(matches!(child.get("x"), Ok(Value::Number(n)) if n == 100.0));
    }

    #[test]
    fn parent_lookup_and_assign() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0)).unwrap();

        let child = Environment::with_parent(parent);
        assert!(matches!(child.get("x"), Ok(Value::Number(n)) if n == 42.0));

        child.assign("x", Value::Number(7.0)).unwrap();
        assert!(matches!(child.get("x"), Ok(Value::Number(n)) if n == 7.0));
    }

    #[test]
    fn multiple_levels() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Number(1.0)).unwrap();

        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Number(2.0)).unwrap();

        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Number(3.0)).unwrap();

        assert!(matches!(child.get("a"), Ok(Value::Number(n)) if n == 1.0));
        assert!(matches!(child.get("b"), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(child.get("c"), Ok(Value::Number(n)) if n == 3.0));
    }
}
