//! What inference asks of the outside world.
//!
//! The engine knows nothing about standard-library calls or platform
//! intrinsics. The code generator's resolver chain answers those questions
//! through [`CallOracle`]; plugin-forced types end up in [`TypeOverrides`].

use rustc_hash::FxHashMap;
use ts2c_ir::{Ast, CallSite, NodeId, StringInterner};

use crate::NativeType;

/// Read access to expression types.
///
/// During inference this answers with the current approximation; after
/// inference with the final type.
pub trait TypeQuery {
    fn node_type(&self, node: NodeId) -> NativeType;
}

/// Typing of calls the program does not define itself.
pub trait CallOracle {
    /// Result type of a non-user call, or `None` if no resolver claims it.
    fn call_type(&self, ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> Option<NativeType>;

    /// A type forced onto an expression regardless of inference.
    fn declare_types(
        &self,
        _ast: &Ast,
        _interner: &StringInterner,
        _node: NodeId,
    ) -> Option<NativeType> {
        None
    }

    /// Globals provided by the platform (no declaration needed).
    fn is_known_global(&self, _name: &str) -> bool {
        false
    }
}

/// An oracle that knows no calls at all.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCallOracle;

impl CallOracle for NoCallOracle {
    fn call_type(&self, _: &Ast, _: &dyn TypeQuery, _: &CallSite) -> Option<NativeType> {
        None
    }
}

/// Types forced onto nodes by plugins. They win over inference.
#[derive(Clone, Debug, Default)]
pub struct TypeOverrides {
    types: FxHashMap<NodeId, NativeType>,
}

impl TypeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, ty: NativeType) {
        self.types.insert(node, ty);
    }

    pub fn get(&self, node: NodeId) -> Option<&NativeType> {
        self.types.get(&node)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NativeType)> {
        self.types.iter().map(|(id, ty)| (*id, ty))
    }
}
