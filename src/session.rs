//! One interpreter, many execution units.
//!
//! A [`Session`] drives the pipeline scan → parse → resolve → interpret for
//! each source string it is given.  Globals and resolution data persist
//! between units, which is what a REPL needs; a file is simply one unit.

use std::fmt;
use std::io::Write;

use log::info;

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;

/// Why an execution unit did not complete.
#[derive(Debug)]
pub enum Failure {
    /// Scan, parse or resolve errors; nothing was executed.
    Static(Vec<LoxError>),

    /// Execution started and stopped at this error.
    Runtime(LoxError),
}

impl Failure {
    /// Host exit status: 65 for static errors, 70 for runtime errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::Static(_) => 65,
            Failure::Runtime(e) => e.exit_code(),
        }
    }

    pub fn errors(&self) -> &[LoxError] {
        match self {
            Failure::Static(errors) => errors,
            Failure::Runtime(e) => std::slice::from_ref(e),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in self.errors() {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

pub struct Session {
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run one execution unit.  Static errors from every stage that ran are
    /// reported together and suppress execution.  Whatever happens, the
    /// unit's own resolution entries are released afterwards.
    pub fn run(&mut self, source: &str) -> Result<(), Failure> {
        let (tokens, mut errors) = scanner::scan(source);

        let statements = match Parser::new(&tokens).parse() {
            Ok(statements) => statements,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                return Err(Failure::Static(errors));
            }
        };

        if !errors.is_empty() {
            return Err(Failure::Static(errors));
        }

        let resolved = Resolver::new(&mut self.interpreter).resolve(&statements);

        let outcome = match resolved {
            Ok(()) => {
                info!("Executing {} statement(s)", statements.len());
                self.interpreter
                    .interpret(&statements)
                    .map_err(Failure::Runtime)
            }
            Err(errors) => Err(Failure::Static(errors)),
        };

        self.interpreter.release(&statements);
        outcome
    }
}
