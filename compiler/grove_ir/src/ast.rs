//! Statement and expression trees for method bodies and initializers.
//!
//! The class graph only stores these trees; it never inspects them. They are
//! produced by the parser and by AST transforms that synthesize methods, so
//! the shape is kept deliberately small.

use crate::{Name, Span};

/// Literal constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    /// `<=>`
    Compare,
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(Name),
    This,
    Property {
        object: Box<Expr>,
        name: Name,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: Name,
        args: Vec<Expr>,
    },
    /// `new Type(args)`; the type is referred to by its source name.
    ConstructorCall {
        type_name: Name,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn var(name: Name) -> Self {
        Expr::Variable(name)
    }

    pub fn property(object: Expr, name: Name) -> Self {
        Expr::Property {
            object: Box::new(object),
            name,
        }
    }

    pub fn call(receiver: Expr, method: Name, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            receiver: Box::new(receiver),
            method,
            args,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    Block(Block),
    If {
        cond: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
}

/// A sequence of statements with the span of its braces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block {
            stmts,
            span: Span::DUMMY,
        }
    }

    /// A block consisting of a single `return expr`.
    pub fn returning(expr: Expr) -> Self {
        Block::new(vec![Stmt::Return(Some(expr))])
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}
