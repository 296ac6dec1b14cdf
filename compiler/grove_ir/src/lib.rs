//! Grove IR - shared front-end data.
//!
//! This crate holds the small, dependency-free pieces every other compiler
//! crate agrees on:
//! - `Span` for source locations
//! - `Name` / `StringInterner` for interned identifiers and qualified names
//! - the statement/expression tree stored in method bodies and field
//!   initializers (`ast`)
//!
//! The concrete-syntax parser lives elsewhere; it produces these values and
//! hands them to `grove_types`.

pub mod ast;
mod interner;
mod name;
mod span;

pub use ast::{BinaryOp, Block, Expr, Literal, Stmt};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
