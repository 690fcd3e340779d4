//! Flat syntax arena.
//!
//! Every node lives in one `Vec` and is addressed by a [`NodeId`]. Parent
//! links are filled in once parsing finishes, which lets the scope queries
//! and the escape analysis walk upward without recursion.
//!
//! ```text
//! Parser ──alloc()──▶ Ast (nodes, no parents)
//!                       │ finish(root)
//!                       ▼
//!                     Ast (nodes + parent links)
//! ```

mod kind;
mod operators;


use std::fmt;

use smallvec::SmallVec;

use crate::{Name, Span};

pub use kind::{NodeKind, SyntaxKind};
pub use operators::{BinaryOp, DeclKind, UnaryOp, UpdateOp};

/// Stable index of a node in the [`Ast`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

/// One syntax node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Arena of syntax nodes for one program.
#[derive(Clone, Debug)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: Vec::with_capacity(256),
            root: NodeId::INVALID,
        }
    }

    /// Allocate a node; its parent link is set by [`Ast::finish`].
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    /// Fix the root and link every node to its parent.
    #[must_use]
    pub fn finish(mut self, root: NodeId) -> Ast {
        self.root = root;
        for index in 0..self.nodes.len() {
            let parent = NodeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            for child in self.nodes[index].kind.children() {
                if let Some(node) = self.nodes.get_mut(child.index()) {
                    node.parent = Some(parent);
                }
            }
        }
        self
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn syntax_kind(&self, id: NodeId) -> SyntaxKind {
        self.kind(id).syntax_kind()
    }

    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        self.kind(id).children()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(|i| NodeId::new(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// `id` and every node below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::Paren { expr } = self.kind(id) {
            id = *expr;
        }
        id
    }

    /// Nearest parent that is not a parenthesized expression.
    pub fn parent_skipping_parens(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        let mut child = id;
        let mut parent = self.parent(child)?;
        while let NodeKind::Paren { .. } = self.kind(parent) {
            child = parent;
            parent = self.parent(child)?;
        }
        Some((parent, child))
    }

    /// Name of an identifier node.
    pub fn ident_name(&self, id: NodeId) -> Option<Name> {
        match self.kind(self.unparen(id)) {
            NodeKind::Ident { name } => Some(*name),
            _ => None,
        }
    }

    /// Follow `a.b[c].d` down to the identifier `a`.
    pub fn root_identifier(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.unparen(id);
        loop {
            match self.kind(current) {
                NodeKind::Ident { .. } => return Some(current),
                NodeKind::Member { object, .. } | NodeKind::Index { object, .. } => {
                    current = self.unparen(*object);
                }
                _ => return None,
            }
        }
    }

    /// Name of the function declared by a `Function` node.
    pub fn function_name(&self, id: NodeId) -> Option<Name> {
        match self.kind(id) {
            NodeKind::Function { name, .. } => Some(*name),
            _ => None,
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}
