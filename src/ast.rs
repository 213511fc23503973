//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Two closed families of tagged variants, [`Expr`] and [`Stmt`], consumed
//! by exhaustive `match` in the resolver, the interpreter and the printer.
//! Nodes are immutable once built.  Nodes that name a binding (`Variable`,
//! `Assign`, `This`, `Super`) carry an [`ExprId`] that keys the resolver's
//! side table of scope distances.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of a binding expression.
///
/// Ids come from a process‑wide counter, so nodes parsed by different
/// parsers (e.g. successive REPL lines) never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    /// Allocate a fresh, never‑before‑seen id.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Every kind of *expression* in Lox.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix `!` or `-`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// A named function or method: shared between the tree and every closure
/// created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// Complete executable constructs.  A program is a `Vec<Stmt>`.
///
/// There is no `for` node: the parser lowers `for` loops into
/// `Block`/`While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
