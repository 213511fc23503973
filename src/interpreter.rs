use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{self, LoxFunction};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `return` is ordinary control flow, distinct
/// from the `Err` path that carries runtime errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Deepest chain of nested calls a program may build.  Each Lox call costs
/// several native frames, so this keeps recursion well inside the main
/// thread's stack.
pub const MAX_CALL_DEPTH: usize = 256;

/// Tree‑walking evaluator.  Lives as long as a session: globals persist
/// across execution units, and so do the resolver's entries for function
/// bodies (see [`Interpreter::release`]).
pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    call_depth: usize,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a new Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates a new Interpreter whose `print` output goes to `out`, and
    /// defines native functions such as `clock`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");
        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(callable::clock())));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            call_depth: 0,
            out,
        }
    }

    /// Record that the binding expression `id` lives `depth` scopes out.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Number of binding expressions with a recorded local depth.
    pub fn resolved_count(&self) -> usize {
        self.locals.len()
    }

    /// Forget the depths recorded for a finished execution unit.  Entries
    /// inside function and method bodies are kept, since closures built
    /// from those bodies can still be called by later units.
    pub fn release(&mut self, statements: &[Stmt]) {
        let mut ids: Vec<ExprId> = Vec::new();
        for stmt in statements {
            top_level_ids(stmt, &mut ids);
        }

        for id in &ids {
            self.locals.remove(id);
        }

        debug!(
            "Released {} binding expression(s), {} still resolved",
            ids.len(),
            self.locals.len()
        );
    }

    /// Names currently bound in the global scope.
    pub fn global_names(&self) -> Vec<String> {
        self.globals.borrow().names().cloned().collect()
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error aborts the rest of the batch.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment: EnvRef = Environment::child_of(&self.environment);
                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);
                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.execute_class(name, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` inside `environment`, restoring the previous scope
    /// afterwards whether they finish, return or fail.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let line = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => name.line,
                    };
                    return Err(LoxError::runtime(line, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra scope binding `super`.
        let method_scope: EnvRef = match &superclass {
            Some(superclass) => {
                let scope: EnvRef = Environment::child_of(&self.environment);
                scope
                    .borrow_mut()
                    .define("super", Value::Class(Rc::clone(superclass)));
                scope
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<String, Rc<LoxFunction>> = methods
            .iter()
            .map(|decl| {
                let function = LoxFunction::new(
                    Rc::clone(decl),
                    Rc::clone(&method_scope),
                    decl.name.lexeme == "init",
                );
                (decl.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), superclass, table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val: Value = self.evaluate(left)?;

                // Result is the last operand evaluated, not a coerced bool.
                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left_val.is_truthy()
                } else {
                    !left_val.is_truthy()
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        if !Environment::assign_at(
                            &self.environment,
                            distance,
                            &name.lexeme,
                            value.clone(),
                        ) {
                            return Err(unresolved(name));
                        }
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(&callee, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(
                    name.line,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name.line, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn call_value(&mut self, callee: &Value, paren: &Token, arguments: Vec<Value>) -> Result<Value> {
        let Some(function) = callee.as_callable() else {
            return Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            ));
        };

        if arguments.len() != function.arity() {
            return Err(LoxError::runtime(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    function.arity(),
                    arguments.len()
                ),
            ));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren.line, "Stack overflow."));
        }

        debug!("Calling {} with {} argument(s)", callee, arguments.len());

        self.call_depth += 1;
        let result = function.call(self, arguments, paren.line);
        self.call_depth -= 1;

        result
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right: Value = self.evaluate(right)?;

        match (&operator.token_type, right) {
            (TokenType::MINUS, Value::Number(n)) => Ok(Value::Number(-n)),
            (TokenType::MINUS, _) => Err(LoxError::runtime(
                operator.line,
                "Operand must be a number.",
            )),
            (_, value) => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(left != right)),
            TokenType::PLUS => {
                return match (left, right) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                    _ => Err(LoxError::runtime(
                        operator.line,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }
            _ => {}
        }

        let (Value::Number(a), Value::Number(b)) = (left, right) else {
            return Err(LoxError::runtime(operator.line, "Operands must be numbers."));
        };

        Ok(match operator.token_type {
            TokenType::MINUS => Value::Number(a - b),
            TokenType::STAR => Value::Number(a * b),
            TokenType::SLASH => Value::Number(a / b),
            TokenType::GREATER => Value::Bool(a > b),
            TokenType::GREATER_EQUAL => Value::Bool(a >= b),
            TokenType::LESS => Value::Bool(a < b),
            TokenType::LESS_EQUAL => Value::Bool(a <= b),
            _ => {
                return Err(LoxError::runtime(
                    operator.line,
                    format!("Invalid binary operator '{}'.", operator.lexeme),
                ))
            }
        })
    }

    /// `super.method`: search from the superclass bound in the method's
    /// closure, bind to the `this` one scope further in.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance: usize = *self.locals.get(&id).ok_or_else(|| unresolved(keyword))?;

        let Some(Value::Class(superclass)) = Environment::get_at(&self.environment, distance, "super")
        else {
            return Err(unresolved(keyword));
        };

        let object: Value = distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, "this"))
            .ok_or_else(|| unresolved(keyword))?;

        let Some(function) = superclass.find_method(&method.lexeme) else {
            return Err(LoxError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            ));
        };

        Ok(Value::Function(Rc::new(function.bind(object))))
    }

    /// Resolved locals jump straight to their scope; everything else is a
    /// global.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| unresolved(name)),
            None => self.globals.borrow().get(name),
        }
    }
}

/// The resolver recorded a distance the runtime chain cannot satisfy.
fn unresolved(name: &Token) -> LoxError {
    LoxError::runtime(
        name.line,
        format!("Undefined variable '{}'.", name.lexeme),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Side-table housekeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Ids of binding expressions that run only while their own unit executes,
/// i.e. everything outside function and method bodies.
fn top_level_ids(stmt: &Stmt, ids: &mut Vec<ExprId>) {
    match stmt {
        Stmt::Expression(expr) | Stmt::Print(expr) => expr_ids(expr, ids),

        Stmt::Var { initializer, .. } => {
            if let Some(expr) = initializer {
                expr_ids(expr, ids);
            }
        }

        Stmt::Block(statements) => {
            for inner in statements {
                top_level_ids(inner, ids);
            }
        }

        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            expr_ids(condition, ids);
            top_level_ids(then_branch, ids);
            if let Some(else_branch) = else_branch {
                top_level_ids(else_branch, ids);
            }
        }

        Stmt::While { condition, body } => {
            expr_ids(condition, ids);
            top_level_ids(body, ids);
        }

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                expr_ids(expr, ids);
            }
        }

        Stmt::Class { superclass, .. } => {
            if let Some(expr) = superclass {
                expr_ids(expr, ids);
            }
        }

        Stmt::Function(_) => {}
    }
}

fn expr_ids(expr: &Expr, ids: &mut Vec<ExprId>) {
    match expr {
        Expr::Literal(_) => {}

        Expr::Grouping(inner) | Expr::Unary { right: inner, .. } => expr_ids(inner, ids),

        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            expr_ids(left, ids);
            expr_ids(right, ids);
        }

        Expr::Variable { id, .. } | Expr::This { id, .. } | Expr::Super { id, .. } => {
            ids.push(*id)
        }

        Expr::Assign { id, value, .. } => {
            ids.push(*id);
            expr_ids(value, ids);
        }

        Expr::Call {
            callee, arguments, ..
        } => {
            expr_ids(callee, ids);
            for arg in arguments {
                expr_ids(arg, ids);
            }
        }

        Expr::Get { object, .. } => expr_ids(object, ids),

        Expr::Set { object, value, .. } => {
            expr_ids(object, ids);
            expr_ids(value, ids);
        }
    }
}
