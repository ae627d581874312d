use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins::BUILTINS;
use crate::object::Object;

/// Shared handle to an environment. Closures keep one of these alive.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    /// A top-level environment with every builtin bound under its name.
    pub fn with_builtins() -> Env {
        let store = BUILTINS
            .iter()
            .map(|builtin| (builtin.name.to_string(), Object::Builtin(*builtin)))
            .collect();

        Rc::new(RefCell::new(Self { store, outer: None }))
    }

    /// A fresh scope whose lookups fall back to `outer`.
    pub fn new_enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Binds `name` in this scope only, shadowing any outer binding.
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }
}
