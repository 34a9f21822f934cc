use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::object::Object;

/// One lexical scope frame. A child frame holds a strong reference to its
/// parent (closures extend the parent's lifetime); parents never point at
/// children, so no reference cycles form through the chain itself.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Rc<RefCell<Environment>>>,
    thoughts: Vec<String>,
    quotes: Vec<Object>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            outer: Some(outer),
            ..Self::default()
        }))
    }

    /// Walks outward through the scope chain until the name is found.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer
            .as_ref()
            .and_then(|outer| outer.borrow().get(name))
    }

    /// Always binds in the local frame: shadows, never mutates, an outer
    /// binding of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }

    /// The local bindings only; used by the introspective builtins.
    pub fn store(&self) -> &HashMap<String, Object> {
        &self.store
    }

    pub fn add_thought(&mut self, thought: impl Into<String>) {
        self.thoughts.push(thought.into());
    }

    pub fn thoughts(&self) -> &[String] {
        &self.thoughts
    }

    pub fn add_quote(&mut self, quote: Object) {
        self.quotes.push(quote);
    }

    pub fn quotes(&self) -> &[Object] {
        &self.quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let outer = Environment::new();
        outer.borrow_mut().set("x", Object::Integer(1));

        let inner = Environment::new_enclosed(outer.clone());
        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(1)));
        assert_eq!(inner.borrow().get("y"), None);
    }

    #[test]
    fn set_shadows_instead_of_mutating_outer() {
        let outer = Environment::new();
        outer.borrow_mut().set("x", Object::Integer(1));

        let inner = Environment::new_enclosed(outer.clone());
        inner.borrow_mut().set("x", Object::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(outer.borrow().get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn thought_and_quote_logs_are_append_only() {
        let env = Environment::new();
        env.borrow_mut().add_thought("first");
        env.borrow_mut().add_thought("second");
        env.borrow_mut().add_quote(Object::Integer(3));

        assert_eq!(env.borrow().thoughts(), ["first", "second"]);
        assert_eq!(env.borrow().quotes(), [Object::Integer(3)]);
    }
}
