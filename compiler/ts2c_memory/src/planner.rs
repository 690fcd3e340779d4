//! Turning heap sites into allocations with one release each.

use rustc_hash::FxHashMap;
use ts2c_ir::{scope, Ast, NodeId, NodeKind, StringInterner};
use ts2c_types::TypeTable;

use crate::allocation::{AllocationCategory, Disposal, GcCollections, ScopeAllocationInfo};
use crate::calls::CallEscapes;
use crate::graph::{Effect, EscapeGraph};
use crate::sites::{find_sites, HeapSite, SiteKind};
use crate::temps::{TempTracker, TemporaryVariable};

/// Allocation decisions for one program.
#[derive(Clone, Debug, Default)]
pub struct MemoryPlan {
    allocations: Vec<ScopeAllocationInfo>,
    by_node: FxHashMap<NodeId, usize>,
    /// Function or program node -> allocations declared there.
    declarations: FxHashMap<NodeId, Vec<usize>>,
    /// Function, program or loop node -> allocations released there.
    destructors: FxHashMap<NodeId, Vec<usize>>,
    collections: GcCollections,
    temps: TempTracker,
}

/// Plan every allocation of the program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn plan_memory(
    ast: &Ast,
    interner: &StringInterner,
    types: &TypeTable,
    calls: &dyn CallEscapes,
) -> MemoryPlan {
    let taken = types.symbols().vars().map(|(_, v)| v.c_name.clone());
    let mut plan = MemoryPlan {
        temps: TempTracker::new(taken),
        ..MemoryPlan::default()
    };
    let graph = EscapeGraph::new(ast, interner, types, calls);

    for site in find_sites(ast, interner, types, calls) {
        plan.add_site(ast, types, &graph, site);
    }

    tracing::debug!(
        allocations = plan.allocations.len(),
        collections = ?plan.collections,
        "memory planned"
    );
    plan
}

impl MemoryPlan {
    fn add_site(&mut self, ast: &Ast, types: &TypeTable, graph: &EscapeGraph<'_>, site: HeapSite) {
        let node = site.node;
        let home = scope::defining_scope(ast, node);
        let innermost_loop = scope::enclosing_loop(ast, node);
        let scope_node = innermost_loop.unwrap_or(home);

        let reused_var = reusable_variable(ast, types, &site);
        match &reused_var {
            Some(name) => self.temps.adopt(node, name, site.ty.clone(), scope_node),
            None => self.temps.track(node, &site.name_hint, site.ty.clone(), scope_node),
        };

        let reach = graph.reach(node);
        for effect in &reach.effects {
            match *effect {
                Effect::Scope(outer) => self.temps.promote(ast, node, outer, false),
                Effect::Container { scope, write } => {
                    self.temps.promote(ast, node, scope, scope::is_in_loop(ast, write));
                }
                Effect::Global => self.temps.promote(ast, node, ast.root(), false),
                Effect::None | Effect::NotSimple => {}
            }
        }

        let Some(temp) = self.temps.get(node) else {
            return;
        };
        let disposal = decide(ast, temp, home, innermost_loop, !reach.not_simple);
        let category = AllocationCategory::for_type(&site.ty, site.owns_contents);

        tracing::trace!(
            node = node.raw(),
            name = %temp.name,
            ?disposal,
            ?category,
            "allocation"
        );

        let info = ScopeAllocationInfo {
            node,
            category,
            var_name: temp.name.clone(),
            ty: site.ty,
            scope_id: home,
            disposal,
            reused: reused_var.is_some(),
        };
        let index = self.allocations.len();
        if !info.reused {
            self.declarations.entry(home).or_default().push(index);
        }
        match disposal {
            Disposal::Collected => self.collections |= category.collection(),
            Disposal::PerIteration(at) | Disposal::AtScopeExit(at) => {
                self.destructors.entry(at).or_default().push(index);
            }
        }
        self.by_node.insert(node, index);
        self.allocations.push(info);
    }

    /// Every allocation, in source order.
    pub fn allocations(&self) -> &[ScopeAllocationInfo] {
        &self.allocations
    }

    pub fn allocation(&self, node: NodeId) -> Option<&ScopeAllocationInfo> {
        self.by_node.get(&node).map(|&i| &self.allocations[i])
    }

    /// Name reserved for the value of `node`.
    pub fn var_name(&self, node: NodeId) -> Option<&str> {
        self.allocation(node).map(|a| a.var_name.as_str())
    }

    /// The allocation of `node` writes straight into its variable.
    pub fn is_reused(&self, node: NodeId) -> bool {
        self.allocation(node).is_some_and(|a| a.reused)
    }

    /// Temporaries to declare in a function (or the program).
    pub fn declarations(&self, scope: NodeId) -> impl Iterator<Item = &ScopeAllocationInfo> {
        self.indexed(self.declarations.get(&scope))
    }

    /// Allocations released when `scope` (function, program or loop
    /// iteration) ends.
    pub fn destructors(&self, scope: NodeId) -> impl Iterator<Item = &ScopeAllocationInfo> {
        self.indexed(self.destructors.get(&scope))
    }

    pub fn has_destructors(&self, scope: NodeId) -> bool {
        self.destructors.get(&scope).is_some_and(|d| !d.is_empty())
    }

    fn indexed<'a>(
        &'a self,
        indices: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a ScopeAllocationInfo> + 'a {
        indices
            .into_iter()
            .flatten()
            .map(move |&i| &self.allocations[i])
    }

    /// Garbage collections `main` has to create and free.
    pub fn collections(&self) -> GcCollections {
        self.collections
    }

    pub fn temps(&self) -> &TempTracker {
        &self.temps
    }

    /// The temporary an expression evaluates to, if any.
    pub fn resolve_temp(
        &self,
        ast: &Ast,
        types: &TypeTable,
        node: NodeId,
    ) -> Option<&TemporaryVariable> {
        self.temps.resolve(ast, types.symbols(), node)
    }
}

/// Pick the release point of one allocation.
fn decide(
    ast: &Ast,
    temp: &TemporaryVariable,
    home: NodeId,
    innermost_loop: Option<NodeId>,
    simple: bool,
) -> Disposal {
    if temp.dispose_later {
        return Disposal::Collected;
    }
    match innermost_loop {
        Some(loop_node) if simple && scope::is_ancestor(ast, loop_node, temp.escape_node) => {
            Disposal::PerIteration(loop_node)
        }
        Some(_) => Disposal::Collected,
        None if scope::is_ancestor(ast, home, temp.escape_node) => Disposal::AtScopeExit(home),
        None => Disposal::Collected,
    }
}

/// The variable a literal can be built in directly: it initializes the
/// variable and nothing ever assigns to it again.
fn reusable_variable(ast: &Ast, types: &TypeTable, site: &HeapSite) -> Option<String> {
    if !matches!(site.kind, SiteKind::ArrayLiteral | SiteKind::ObjectLiteral) {
        return None;
    }
    let (parent, _) = ast.parent_skipping_parens(site.node)?;
    if !matches!(ast.kind(parent), NodeKind::Declarator { .. }) {
        return None;
    }
    let var = types.symbols().declared_by(parent)?;
    let info = types.var(var);
    let reassigned = info.references.iter().any(|&r| {
        ast.parent_skipping_parens(r).is_some_and(|(p, c)| {
            matches!(ast.kind(p), NodeKind::Assign { target, .. } if *target == c)
                || matches!(ast.kind(p), NodeKind::Update { .. })
        })
    });
    (!reassigned).then(|| info.c_name.clone())
}

#[cfg(test)]
mod tests;
