//! Short-lived heap values produced by sub-expressions.
//!
//! Each tracked node owns a uniquely named C temporary. `scope_node` is
//! where the value is created; `escape_node` is the outermost node it has
//! to stay valid for. `escape_node` only ever moves outward.

use rustc_hash::{FxHashMap, FxHashSet};
use ts2c_ir::{scope, Ast, NodeId, NodeKind};
use ts2c_types::{NativeType, SymbolTable};

#[derive(Clone, Debug, PartialEq)]
pub struct TemporaryVariable {
    pub name: String,
    pub ty: NativeType,
    pub scope_node: NodeId,
    /// Always `scope_node` or one of its ancestors.
    pub escape_node: NodeId,
    /// Written into a container inside a loop: release is deferred to a
    /// collection.
    pub dispose_later: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TempTracker {
    temps: FxHashMap<NodeId, TemporaryVariable>,
    used_names: FxHashSet<String>,
}

impl TempTracker {
    /// A tracker whose names avoid `taken`.
    pub fn new<I, S>(taken: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TempTracker {
            temps: FxHashMap::default(),
            used_names: taken.into_iter().map(Into::into).collect(),
        }
    }

    /// `base`, or `base_2`, `base_3`, ... whichever is free first.
    pub fn unique_name(&mut self, base: &str) -> String {
        if self.used_names.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used_names.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Start tracking `node`, or return its existing temporary.
    pub fn track(
        &mut self,
        node: NodeId,
        base_name: &str,
        ty: NativeType,
        scope_node: NodeId,
    ) -> &TemporaryVariable {
        if !self.temps.contains_key(&node) {
            let name = self.unique_name(base_name);
            self.temps.insert(
                node,
                TemporaryVariable {
                    name,
                    ty,
                    scope_node,
                    escape_node: scope_node,
                    dispose_later: false,
                },
            );
        }
        &self.temps[&node]
    }

    /// Track `node` under a name some variable already owns.
    pub fn adopt(
        &mut self,
        node: NodeId,
        name: &str,
        ty: NativeType,
        scope_node: NodeId,
    ) -> &TemporaryVariable {
        self.used_names.insert(name.to_string());
        self.temps
            .entry(node)
            .or_insert_with(|| TemporaryVariable {
                name: name.to_string(),
                ty,
                scope_node,
                escape_node: scope_node,
                dispose_later: false,
            })
    }

    /// Record that `node`'s value must stay valid within `outer`.
    ///
    /// Unrelated scopes widen to the program root. A write performed
    /// inside a loop defers the release.
    pub fn promote(&mut self, ast: &Ast, node: NodeId, outer: NodeId, in_loop: bool) {
        let Some(temp) = self.temps.get_mut(&node) else {
            return;
        };
        let current = temp.escape_node;
        temp.escape_node = if scope::is_ancestor(ast, current, outer) {
            current
        } else if scope::is_ancestor(ast, outer, current) {
            outer
        } else {
            ast.root()
        };
        if in_loop {
            temp.dispose_later = true;
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&TemporaryVariable> {
        self.temps.get(&node)
    }

    /// The temporary `node` evaluates to: through parentheses, and through
    /// variables initialized with a tracked value.
    pub fn resolve(&self, ast: &Ast, symbols: &SymbolTable, node: NodeId) -> Option<&TemporaryVariable> {
        let mut current = ast.unparen(node);
        let mut seen = FxHashSet::default();
        loop {
            if let Some(temp) = self.temps.get(&current) {
                return Some(temp);
            }
            if !seen.insert(current) {
                return None;
            }
            let var = symbols.resolve(current)?;
            let NodeKind::Declarator { init: Some(init), .. } =
                ast.kind(symbols.var(var).declaration)
            else {
                return None;
            };
            current = ast.unparen(*init);
        }
    }

    pub fn len(&self) -> usize {
        self.temps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TemporaryVariable)> {
        self.temps.iter().map(|(id, t)| (*id, t))
    }
}

#[cfg(test)]
mod tests;
