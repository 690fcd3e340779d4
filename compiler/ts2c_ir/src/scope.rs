//! Pure structural queries over the syntax tree.
//!
//! All queries walk parent links; none of them cross a function boundary
//! unless stated otherwise.

use crate::{Ast, NodeId, NodeKind};

/// Nearest enclosing `Function` node (never `id` itself).
pub fn enclosing_function(ast: &Ast, id: NodeId) -> Option<NodeId> {
    let mut current = ast.parent(id);
    while let Some(node) = current {
        if let NodeKind::Function { .. } = ast.kind(node) {
            return Some(node);
        }
        current = ast.parent(node);
    }
    None
}

/// The function whose body defines `id`, or the program root.
pub fn defining_scope(ast: &Ast, id: NodeId) -> NodeId {
    enclosing_function(ast, id).unwrap_or_else(|| ast.root())
}

/// Nearest loop whose iterations re-evaluate `id`.
///
/// A `for` initializer and a `for-of`/`for-in` iterable run once, so they
/// belong to the surrounding scope rather than the loop.
pub fn enclosing_loop(ast: &Ast, id: NodeId) -> Option<NodeId> {
    let mut child = id;
    let mut current = ast.parent(id);
    while let Some(node) = current {
        match ast.kind(node) {
            NodeKind::Function { .. } => return None,
            NodeKind::For { init, .. } if *init == Some(child) => {}
            NodeKind::ForOf { left, right, .. } | NodeKind::ForIn { left, right, .. }
                if *right == child || *left == child => {}
            NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::For { .. }
            | NodeKind::ForOf { .. }
            | NodeKind::ForIn { .. } => return Some(node),
            _ => {}
        }
        child = node;
        current = ast.parent(node);
    }
    None
}

/// Nearest `if` arm or conditional-expression arm containing `id`.
pub fn enclosing_branch(ast: &Ast, id: NodeId) -> Option<NodeId> {
    let mut child = id;
    let mut current = ast.parent(id);
    while let Some(node) = current {
        match ast.kind(node) {
            NodeKind::Function { .. } => return None,
            NodeKind::If { cond, .. } | NodeKind::Conditional { cond, .. } if *cond != child => {
                return Some(node);
            }
            _ => {}
        }
        child = node;
        current = ast.parent(node);
    }
    None
}

/// The statement containing `id`: the ancestor-or-self whose parent owns a
/// statement list.
pub fn enclosing_statement(ast: &Ast, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    loop {
        let parent = ast.parent(current)?;
        if ast.kind(parent).is_statement_list() {
            return Some(current);
        }
        current = parent;
    }
}

/// `ancestor` is `node` or one of its ancestors (crosses functions).
pub fn is_ancestor(ast: &Ast, ancestor: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = ast.parent(id);
    }
    false
}

/// Is `id` re-evaluated by an enclosing loop of its own function?
pub fn is_in_loop(ast: &Ast, id: NodeId) -> bool {
    enclosing_loop(ast, id).is_some()
}

/// Every loop between `id` and its defining scope, innermost first.
pub fn enclosing_loops(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    let mut loops = Vec::new();
    let mut current = enclosing_loop(ast, id);
    while let Some(node) = current {
        loops.push(node);
        current = enclosing_loop(ast, node);
    }
    loops
}

/// Nearest common ancestor of two nodes.
pub fn common_ancestor(ast: &Ast, a: NodeId, b: NodeId) -> NodeId {
    let mut current = Some(a);
    while let Some(id) = current {
        if is_ancestor(ast, id, b) {
            return id;
        }
        current = ast.parent(id);
    }
    ast.root()
}

#[cfg(test)]
mod tests;
