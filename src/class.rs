use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// A class: its method table plus an optional superclass to look through.
pub struct LoxClass {
    name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look `name` up in this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| s.name()))
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Calling a class allocates an instance and runs `init`, if any, on it.
impl Callable for Rc<LoxClass> {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Value::Instance(Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self)))));

        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind(instance.clone())
                .call(interpreter, arguments, line)?;
        }

        Ok(instance)
    }
}

/// An object: a class reference and late‑bound fields.
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass> {
        &self.class
    }

    /// Property read: fields shadow methods; methods come back bound to
    /// `instance`.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value> {
        let this = instance.borrow();

        if let Some(value) = this.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = this.class.find_method(&name.lexeme) {
            let bound = method.bind(Value::Instance(Rc::clone(instance)));
            return Ok(Value::Function(Rc::new(bound)));
        }

        Err(LoxError::runtime(
            name.line,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    /// Property write: creates the field on first assignment.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
