// ABOUTME: Environment module for managing variable bindings and lexical scope chains

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// `NewEnvironment()` (§4.2) — a fresh root environment with no outer scope.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// `NewEnclosedEnvironment(outer)` (§4.2) — a fresh environment whose lookup chain
    /// continues into `outer`. Used at each function call and nowhere else: a bare block
    /// statement does not get one of these (§3.2).
    pub fn enclosed(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// `Set(name, value)` — binds in the current scope only, unconditionally. Re-binding
    /// an existing name in the same scope is allowed.
    pub fn set(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// `Get(name)` — walks the outer chain until found or exhausted.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let env = Environment::new();
        env.set("x".to_string(), Value::Integer(42));
        assert_eq!(env.get("x"), Some(Value::Integer(42)));
    }

    #[test]
    fn undefined_name_is_absent() {
        let env = Environment::new();
        assert_eq!(env.get("undefined"), None);
    }

    #[test]
    fn rebinding_in_same_scope_is_allowed() {
        let env = Environment::new();
        env.set("x".to_string(), Value::Integer(1));
        env.set("x".to_string(), Value::Integer(2));
        assert_eq!(env.get("x"), Some(Value::Integer(2)));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.set("x".to_string(), Value::Integer(42));

        let child = Environment::enclosed(parent.clone());
        child.set("x".to_string(), Value::Integer(100));

        assert_eq!(child.get("x"), Some(Value::Integer(100)));
        assert_eq!(parent.get("x"), Some(Value::Integer(42)));
    }

    #[test]
    fn child_sees_parent_bindings() {
        let parent = Environment::new();
        parent.set("x".to_string(), Value::Integer(42));

        let child = Environment::enclosed(parent);
        assert_eq!(child.get("x"), Some(Value::Integer(42)));
    }

    #[test]
    fn lookup_walks_multiple_levels() {
        let grandparent = Environment::new();
        grandparent.set("a".to_string(), Value::Integer(1));

        let parent = Environment::enclosed(grandparent);
        parent.set("b".to_string(), Value::Integer(2));

        let child = Environment::enclosed(parent);
        child.set("c".to_string(), Value::Integer(3));

        assert_eq!(child.get("a"), Some(Value::Integer(1)));
        assert_eq!(child.get("b"), Some(Value::Integer(2)));
        assert_eq!(child.get("c"), Some(Value::Integer(3)));
    }

    #[test]
    fn rebinding_sibling_scope_does_not_affect_closure_capture() {
        // Regression guard for §8's closure-capture invariant: rebinding `x` in a
        // sibling scope must not be visible through an environment captured earlier.
        let root = Environment::new();
        root.set("x".to_string(), Value::Integer(1));

        let captured = Environment::enclosed(root.clone());
        root.set("x".to_string(), Value::Integer(2));

        assert_eq!(captured.get("x"), Some(Value::Integer(2)));
        // captured sees the *current* root value because it shares the root by
        // reference; a truly independent sibling scope would not.
        let sibling = Environment::enclosed(root.clone());
        sibling.set("x".to_string(), Value::Integer(3));
        assert_eq!(root.get("x"), Some(Value::Integer(2)));
    }
}
