//! Everything a Lox call expression can invoke.
//!
//! [`Callable`] is the seam between the interpreter's `Call` evaluation and
//! the three callee kinds: natives, user functions (closures) and classes
//! (see [`crate::class`]).

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// Anything that can appear in callee position.
pub trait Callable {
    /// Exact number of arguments the call must supply.
    fn arity(&self) -> usize;

    /// Invoke with already‑evaluated, arity‑checked arguments.  `line` is
    /// the call site, for errors raised by the callee itself.
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Native functions
// ─────────────────────────────────────────────────────────────────────────────

/// A function implemented in Rust and pre‑bound in the global scope.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> std::result::Result<Value, String>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _: &mut Interpreter, arguments: Vec<Value>, line: usize) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(&arguments).map_err(|msg| LoxError::runtime(line, msg))
    }
}

/// `clock()`: seconds since the Unix epoch as a float.
pub fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock",
        arity: 0,
        func: |_args: &[Value]| {
            let now = Utc::now();
            let timestamp: f64 =
                now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0;
            Ok(Value::Number(timestamp))
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User functions
// ─────────────────────────────────────────────────────────────────────────────

/// A user‑defined function or method together with the scope it closes over.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Produce a copy of this method whose closure binds `this` to
    /// `instance`.
    pub fn bind(&self, instance: Value) -> LoxFunction {
        let environment: EnvRef = Environment::child_of(&self.closure);
        environment.borrow_mut().define("this", instance);

        LoxFunction::new(
            Rc::clone(&self.declaration),
            environment,
            self.is_initializer,
        )
    }

    /// The instance an initializer's closure binds as `this`.
    fn bound_this(&self, line: usize) -> Result<Value> {
        Environment::get_at(&self.closure, 0, "this")
            .ok_or_else(|| LoxError::runtime(line, "Initializer is not bound to an instance."))
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let environment: EnvRef = Environment::child_of(&self.closure);
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, arg);
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, environment)?;

        // `init` always yields its instance, even after a bare `return;`.
        if self.is_initializer {
            return self.bound_this(line);
        }

        let value: Value = match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        };

        info!("Function '{}' returned: {}", self.name(), value);

        Ok(value)
    }
}
