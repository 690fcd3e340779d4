//! Uniform view of a call expression.
//!
//! Inference, escape analysis and lowering all ask the same questions about
//! a call: is it `recv.method(..)` or `func(..)`, what are the arguments.
//! [`CallSite`] answers them once.

use smallvec::SmallVec;

use crate::{Ast, NodeId, NodeKind, StringInterner};

/// A decoded `Call` node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// The `Call` node itself.
    pub node: NodeId,
    pub callee: NodeId,
    /// `recv` in `recv.method(..)`.
    pub receiver: Option<NodeId>,
    /// Identifier text of the receiver when it is a plain identifier.
    pub receiver_name: Option<&'static str>,
    /// `method` in `recv.method(..)`.
    pub method: Option<&'static str>,
    /// `func` in `func(..)`.
    pub function: Option<&'static str>,
    pub args: SmallVec<[NodeId; 4]>,
}

impl CallSite {
    /// Decode `id`, or `None` if it is not a call.
    pub fn from_node(ast: &Ast, interner: &StringInterner, id: NodeId) -> Option<CallSite> {
        let NodeKind::Call { callee, args } = ast.kind(id) else {
            return None;
        };
        let callee = *callee;
        let mut site = CallSite {
            node: id,
            callee,
            receiver: None,
            receiver_name: None,
            method: None,
            function: None,
            args: args.iter().copied().collect(),
        };

        match ast.kind(ast.unparen(callee)) {
            NodeKind::Member { object, property } => {
                site.receiver = Some(*object);
                site.receiver_name = ast.ident_name(*object).map(|n| interner.lookup(n));
                site.method = Some(interner.lookup(*property));
            }
            NodeKind::Ident { name } => {
                site.function = Some(interner.lookup(*name));
            }
            _ => {}
        }

        Some(site)
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// `recv.<name>(..)` for any receiver.
    pub fn is_method(&self, name: &str) -> bool {
        self.method == Some(name)
    }

    /// `<object>.<name>(..)` where the receiver is the identifier `object`.
    pub fn is_qualified(&self, object: &str, name: &str) -> bool {
        self.receiver_name == Some(object) && self.method == Some(name)
    }

    /// Plain `<name>(..)`.
    pub fn is_function(&self, name: &str) -> bool {
        self.function == Some(name)
    }

    pub fn arg(&self, index: usize) -> Option<NodeId> {
        self.args.get(index).copied()
    }
}
