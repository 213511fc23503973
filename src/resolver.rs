//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, forward‑read in initializer, invalid
//!    `return`, misplaced `this`/`super`, self‑inheritance).
//! 3. Tell the interpreter, for *each* binding expression, at what depth its
//!    local lives.  Expressions left unrecorded are globals.
//!
//! Errors are collected, never thrown: every reachable node is visited once
//! and the full list is returned at the end.
//!
//! A name whose initializer is still being resolved is *declared* but not
//! *defined*.  A read that meets such an entry keeps looking outward for a
//! defined binding; only when none exists is the read reported.  A write
//! binds the innermost entry whether or not it is defined yet.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

/// What kind of class body are we in?  Used to validate `this` / `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    globals: HashMap<String, bool>,
    current_function: FunctionType,
    current_class: ClassType,
    errors: Vec<LoxError>,
}

impl<'interp> Resolver<'interp> {
    /// Create a new resolver bound to the given interpreter.  Globals the
    /// interpreter already holds count as defined.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");

        let globals: HashMap<String, bool> = interpreter
            .global_names()
            .into_iter()
            .map(|name| (name, true))
            .collect();

        Resolver {
            interpreter,
            scopes: Vec::new(),
            globals,
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements.
    pub fn resolve(&mut self, statements: &[Stmt]) -> Result<(), Vec<LoxError>> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            info!("Resolve pass found {} error(s)", self.errors.len());
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.errors.push(LoxError::resolve(token, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // name is visible *inside* its own body (recursion)
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable { name: super_name, .. } = superclass {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.bind_implicit("super");
        }

        self.begin_scope();
        self.bind_implicit("this");

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                if !self.resolve_local(*id, name, false) {
                    self.error(name, "Can't read local variable in its own initializer.");
                }
            }

            Expr::Assign { id, name, value } => {
                // A write may target a slot whose initializer is running.
                self.resolve_expr(value);
                self.resolve_local(*id, name, true);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, keyword, false);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassType::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(*id, keyword, false);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &decl.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind a keyword (`this`, `super`) in the innermost scope.
    fn bind_implicit(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn declare(&mut self, name: &Token) {
        let duplicate: bool = self
            .scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name.lexeme));

        if duplicate {
            self.error(name, "Already a variable with this name in this scope.");
            return;
        }

        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.lexeme.clone(), false);
            }
            None => {
                // Globals may be redeclared; an existing definition stays
                // visible to the new initializer.
                self.globals.entry(name.lexeme.clone()).or_insert(false);
            }
        }
    }

    fn define(&mut self, name: &Token) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.lexeme.clone(), true);
            }
            None => {
                self.globals.insert(name.lexeme.clone(), true);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this binding occurrence as either a local at depth `d` or a
    /// global.  Reads skip entries still inside their own initializer;
    /// writes (`is_write`) bind the innermost entry either way.  Returns
    /// `false` when a read finds no defined binding at all.
    fn resolve_local(&mut self, id: ExprId, name: &Token, is_write: bool) -> bool {
        let mut initializing = false;

        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            match scope.get(&name.lexeme) {
                Some(&defined) if defined || is_write => {
                    debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                    self.interpreter.resolve(id, depth);
                    return true;
                }
                Some(_) => initializing = true,
                None => {}
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);

        match self.globals.get(&name.lexeme) {
            Some(false) => false,
            Some(true) => true,
            None => !initializing,
        }
    }
}
