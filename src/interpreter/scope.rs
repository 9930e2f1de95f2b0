use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::value::Value;

/// Lexical environment with a parent chain.
///
/// Scopes are reference counted: function values keep the scope of their
/// definition site alive after the defining block is gone.
#[derive(Debug, Default)]
pub struct Scope {
    store: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new() -> Rc<Scope> {
        Rc::new(Scope::default())
    }

    /// A new empty scope with self as parent.
    pub fn child(self: &Rc<Self>) -> Rc<Scope> {
        Rc::new(Scope {
            store: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    /// Read a binding, walking the parent chain until found.
    pub fn read(&self, name: &str) -> Option<Value> {
        match self.store.borrow().get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|parent| parent.read(name)),
        }
    }

    /// Write a binding into this scope only, shadowing any parent.
    pub fn write(&self, name: impl Into<String>, value: Value) {
        self.store.borrow_mut().insert(name.into(), value);
    }

    /// Update the nearest scope in the chain that holds the binding.
    /// Returns false when no scope holds it.
    pub fn update(&self, name: &str, value: Value) -> bool {
        if self.store.borrow().contains_key(name) {
            self.store.borrow_mut().insert(name.to_string(), value);
            return true;
        }

        match &self.parent {
            Some(parent) => parent.update(name, value),
            None => false,
        }
    }

    /// Check this scope's own bindings, ignoring parents.
    pub fn has_local(&self, name: &str) -> bool {
        self.store.borrow().contains_key(name)
    }
}
