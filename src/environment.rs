use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Blocks, calls and every closure that
/// captured the scope hold one; the scope lives as long as the longest holder.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One runtime scope: its own bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh child of `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Insert or overwrite `name` in *this* scope only.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Names bound directly in this scope.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Search this scope, then each enclosing scope outward.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite the nearest existing binding of `name`.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Walk exactly `distance` links outward.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Read `name` from the scope exactly `distance` hops out.  `None` means
    /// the resolver and the runtime chain disagree.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        let scope: EnvRef = Self::ancestor(env, distance)?;
        let value: Option<Value> = scope.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` in the scope exactly `distance` hops out.  Returns
    /// `false` if that scope does not exist.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &str, value: Value) -> bool {
        match Self::ancestor(env, distance) {
            Some(scope) => {
                scope.borrow_mut().values.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(
        name.line,
        format!("Undefined variable '{}'.", name.lexeme),
    )
}
