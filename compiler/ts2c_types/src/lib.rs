//! Type model and inference for ts2c.
//!
//! Source programs carry no usable annotations, so every variable's C type
//! is recovered from how it is used:
//!
//! 1. [`SymbolTable::build`] declares variables and resolves identifiers.
//! 2. Collection records a [`TypePromise`] for every initializer, return,
//!    call argument, loop binding, push and property write.
//! 3. The fixpoint re-evaluates promises with [`merge`] until nothing
//!    changes, or gives up with [`InferenceError::FixpointDiverged`].
//! 4. Finalization names structs and produces the [`TypeTable`].

mod error;
mod infer;
mod merge;
mod native_type;
pub mod numeric;
mod oracle;
mod promise;
mod symbols;
mod table;

pub use error::InferenceError;
pub use infer::{infer_types, InferOptions, InferOutput};
pub use merge::{merge, merge_all, merge_with_conflict};
pub use native_type::{ArrayType, NativeType, Primitive, StructType};
pub use oracle::{CallOracle, NoCallOracle, TypeOverrides, TypeQuery};
pub use promise::{PathSeg, PromiseKind, TypePromise};
pub use symbols::{SymbolTable, VarId, VarKind, VariableInfo};
pub use table::{ObjectRepr, TypeTable};
