//! How calls the program does not define treat their arguments.

use ts2c_ir::{Ast, CallSite};
use ts2c_types::TypeTable;

/// Where a value passed as a call argument ends up.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EscapeTarget {
    /// The call only reads the argument.
    None,
    /// The argument is stored into the receiver (`arr.push(x)`).
    Receiver,
    /// The argument is part of the call's result.
    Result,
    /// Unknown destination; the value must outlive everything.
    Global,
}

/// Memory behaviour of standard and platform calls.
pub trait CallEscapes {
    /// Does the call return a fresh heap value the caller must release?
    fn needs_disposal(&self, ast: &Ast, types: &TypeTable, site: &CallSite) -> bool;

    /// Preferred name for the temporary holding the call's result.
    fn temp_var_name(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> Option<String> {
        None
    }

    /// The returned array owns the heap values it contains.
    fn owns_contents(&self, _ast: &Ast, _types: &TypeTable, _site: &CallSite) -> bool {
        false
    }

    /// Destination of the argument at `index`.
    fn escape_target(
        &self,
        ast: &Ast,
        types: &TypeTable,
        site: &CallSite,
        index: usize,
    ) -> EscapeTarget;
}

/// Knows no calls: nothing allocates, every argument escapes.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCallEscapes;

impl CallEscapes for NoCallEscapes {
    fn needs_disposal(&self, _: &Ast, _: &TypeTable, _: &CallSite) -> bool {
        false
    }

    fn escape_target(&self, _: &Ast, _: &TypeTable, _: &CallSite, _: usize) -> EscapeTarget {
        EscapeTarget::Global
    }
}
