//! C code generation for ts2c.
//!
//! Lowering turns every AST node into a [`Renderable`]: a template plus
//! named fields. Rendering is a separate, pure step that also carries
//! hoisted statements (temporaries, allocations) up to the statement that
//! needs them. Everything a platform can extend lives in a
//! [`CompilationContext`]:
//!
//! - header implementations, resolved as a dependency fixpoint
//! - plugins and standard resolvers for calls the program does not define
//! - startup code (`Main`) and named callbacks (`Bottom`)
//! - the `SyntaxKind` -> factory lowering table

pub mod context;
pub mod ctype;
mod error;
pub mod lower;
mod program;
pub mod registry;
pub mod resolve;
pub mod runtime;
mod template;

pub use context::CompilationContext;
pub use error::CodegenError;
pub use lower::{Code, LowerCx, LowerFn, Lowered, LoweringTable, Unsupported};
pub use program::{generate, CodegenOutput};
pub use registry::{Bottom, Header, HeaderCx, HeaderRegistry, HeaderSet, Main, Preset};
pub use resolve::{AsResolver, CallResolver, Plugin, ResolverChain};
pub use template::{render, render_block, Block, Field, Rendered, Renderable, ToField};

#[cfg(test)]
mod test_helpers;
