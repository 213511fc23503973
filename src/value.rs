use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{Callable, LoxFunction, NativeFunction};
use crate::class::{LoxClass, LoxInstance};

/// A dynamically‑typed Lox runtime value.
///
/// Scalars are stored inline; functions, classes and instances are shared
/// handles, so copying a `Value` never copies an object.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The callable behind this value, if it has one.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::NativeFunction(native) => Some(&**native),
            Value::Function(function) => Some(&**function),
            Value::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Scalars compare by value, objects by identity.  Never fails.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Integral numbers print without a fractional part; everything else uses
/// the shortest round‑trip form.
fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        if n == 0.0 && n.is_sign_negative() {
            return write!(f, "-0");
        }
        let mut buf: itoa::Buffer = itoa::Buffer::new();
        write!(f, "{}", buf.format(n as i64))
    } else if n.fract() == 0.0 {
        write!(f, "{:.0}", n)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => format_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction(_) => write!(f, "<native fn>"),

            Value::Function(function) => write!(f, "{}", function),

            Value::Class(class) => write!(f, "{}", class.name()),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class().name()),
        }
    }
}
