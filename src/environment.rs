//! Variable environment for Monkey
//!
//! Each scope maps names to objects and may point to an enclosing scope.
//! Function calls get a fresh scope whose parent is the scope the function
//! was created in, which is what makes closures work.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// A shared, mutable handle to a scope
pub type Env = Rc<RefCell<Environment>>;

/// Variable environment with lexical scoping
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Object>,
    parent: Option<Env>,
}

impl Environment {
    /// Create a new global environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child environment with parent scope
    pub fn with_parent(parent: Env) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// A fresh top-level scope, ready to share
    pub fn new_env() -> Env {
        Rc::new(RefCell::new(Self::new()))
    }

    /// A fresh scope enclosed by `parent`
    pub fn enclosed(parent: &Env) -> Env {
        Rc::new(RefCell::new(Self::with_parent(Rc::clone(parent))))
    }

    /// Bind `name` in this scope, shadowing any outer binding
    pub fn define(&mut self, name: impl Into<String>, value: Object) {
        self.values.insert(name.into(), value);
    }

    /// Look `name` up here, then in each enclosing scope
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref()?.borrow().get(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::TRUE;

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x", Object::Integer(5));
        assert_eq!(env.get("x"), Some(Object::Integer(5)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_lookup_walks_parents() {
        let global = Environment::new_env();
        global.borrow_mut().define("x", Object::Integer(1));

        let inner = Environment::enclosed(&global);
        inner.borrow_mut().define("y", TRUE);

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(1)));
        assert_eq!(inner.borrow().get("y"), Some(TRUE));
        assert_eq!(global.borrow().get("y"), None);
    }

    #[test]
    fn test_shadowing() {
        let global = Environment::new_env();
        global.borrow_mut().define("x", Object::Integer(1));

        let inner = Environment::enclosed(&global);
        inner.borrow_mut().define("x", Object::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_parent_sees_later_definitions() {
        let global = Environment::new_env();
        let inner = Environment::enclosed(&global);
        global.borrow_mut().define("late", Object::Integer(9));

        assert_eq!(inner.borrow().get("late"), Some(Object::Integer(9)));
    }
}
