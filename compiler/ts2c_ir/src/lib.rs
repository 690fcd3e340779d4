//! Syntax tree and shared vocabulary for the ts2c compiler.
//!
//! # Architecture
//!
//! ```text
//! ts2c_lexer ─▶ ts2c_parse ─▶ Ast (this crate)
//!                               │
//!          ┌────────────────────┼─────────────────────┐
//!          ▼                    ▼                     ▼
//!     ts2c_types          ts2c_memory           ts2c_codegen
//! ```
//!
//! Everything downstream of the parser addresses nodes by [`NodeId`] and
//! identifiers by [`Name`]; neither owns source text.

mod ast;
mod call;
mod interner;
mod name;
pub mod scope;
mod span;
pub mod stack;

pub use ast::{
    Ast, BinaryOp, DeclKind, Node, NodeId, NodeKind, SyntaxKind, UnaryOp, UpdateOp,
};
pub use call::CallSite;
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
