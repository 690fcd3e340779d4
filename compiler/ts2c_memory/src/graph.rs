//! The use graph escape analysis walks.
//!
//! Nodes are expressions and variables. An edge leads from a value to
//! every place that value is handed on: the variable it initializes, the
//! parameter it binds, the call sites a `return` reaches, the container
//! literal it becomes part of. Each edge carries the effect crossing it
//! has on the value's lifetime.

use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use ts2c_ir::{scope, Ast, CallSite, NodeId, NodeKind, StringInterner};
use ts2c_types::{TypeTable, VarId};

use crate::calls::{CallEscapes, EscapeTarget};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FlowNode {
    Expr(NodeId),
    Var(VarId),
}

/// What following an edge means for the value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Effect {
    None,
    /// Must stay valid throughout this scope node.
    Scope(NodeId),
    /// Stored into a container anchored at `scope` by the node `write`.
    Container { scope: NodeId, write: NodeId },
    /// Plain assignment: the holder may be overwritten later.
    NotSimple,
    /// Unknown destination.
    Global,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Step {
    pub to: Option<FlowNode>,
    pub effect: Effect,
}

impl Step {
    fn flow(to: FlowNode) -> Self {
        Step {
            to: Some(to),
            effect: Effect::None,
        }
    }

    fn with(to: FlowNode, effect: Effect) -> Self {
        Step {
            to: Some(to),
            effect,
        }
    }

    fn effect(effect: Effect) -> Self {
        Step { to: None, effect }
    }
}

/// Everything reachable from one value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reach {
    pub effects: Vec<Effect>,
    pub vars: Vec<VarId>,
    pub not_simple: bool,
}

pub struct EscapeGraph<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    types: &'a TypeTable,
    calls: &'a dyn CallEscapes,
}

impl<'a> EscapeGraph<'a> {
    pub fn new(
        ast: &'a Ast,
        interner: &'a StringInterner,
        types: &'a TypeTable,
        calls: &'a dyn CallEscapes,
    ) -> Self {
        EscapeGraph {
            ast,
            interner,
            types,
            calls,
        }
    }

    /// Walk every use reachable from `start`. Each graph node is visited
    /// once.
    pub fn reach(&self, start: NodeId) -> Reach {
        let mut reach = Reach::default();
        let mut visited: FxHashSet<FlowNode> = FxHashSet::default();
        let mut worklist = vec![FlowNode::Expr(start)];

        while let Some(node) = worklist.pop() {
            if !visited.insert(node) {
                continue;
            }
            if let FlowNode::Var(var) = node {
                reach.vars.push(var);
            }
            for step in self.successors(node) {
                match step.effect {
                    Effect::None => {}
                    Effect::NotSimple => reach.not_simple = true,
                    effect => reach.effects.push(effect),
                }
                if let Some(to) = step.to {
                    worklist.push(to);
                }
            }
        }
        reach
    }

    /// Outgoing edges of one graph node.
    pub fn successors(&self, node: FlowNode) -> SmallVec<[Step; 4]> {
        match node {
            FlowNode::Var(var) => self
                .types
                .var(var)
                .references
                .iter()
                .map(|&r| Step::flow(FlowNode::Expr(r)))
                .collect(),
            FlowNode::Expr(expr) => self.expr_successors(expr),
        }
    }

    fn expr_successors(&self, expr: NodeId) -> SmallVec<[Step; 4]> {
        // `s += x` stores its own result back into `s`.
        let mut steps = match self.ast.kind(expr) {
            NodeKind::Assign {
                op: Some(_), target, ..
            } => self.assignment(expr, *target),
            _ => SmallVec::new(),
        };
        steps.extend(self.parent_successors(expr));
        steps
    }

    fn parent_successors(&self, expr: NodeId) -> SmallVec<[Step; 4]> {
        let ast = self.ast;
        let symbols = self.types.symbols();
        let Some((parent, child)) = ast.parent_skipping_parens(expr) else {
            return SmallVec::new();
        };

        match ast.kind(parent) {
            NodeKind::Conditional { cond, .. } if *cond != child => {
                smallvec![Step::flow(FlowNode::Expr(parent))]
            }
            NodeKind::Declarator { init: Some(init), .. } if *init == child => {
                match symbols.declared_by(parent) {
                    Some(var) => smallvec![Step::with(
                        FlowNode::Var(var),
                        Effect::Scope(symbols.var(var).scope)
                    )],
                    None => SmallVec::new(),
                }
            }
            NodeKind::Assign {
                op: None,
                target,
                value,
            } if *value == child => self.assignment(parent, *target),
            NodeKind::Return { .. } => self.returned(parent),
            NodeKind::Call { callee, args } if *callee != child => {
                match args.iter().position(|&a| a == child) {
                    Some(index) => self.argument(parent, *callee, index),
                    None => SmallVec::new(),
                }
            }
            NodeKind::Member { object, .. } | NodeKind::Index { object, .. }
                if *object == child =>
            {
                let is_method_call = ast.parent_skipping_parens(parent).is_some_and(|(p, c)| {
                    matches!(ast.kind(p), NodeKind::Call { callee, .. } if *callee == c)
                });
                let ty = self.types.type_of(parent);
                if !is_method_call && (ty.is_heap_container() || ty.is_str()) {
                    smallvec![Step::flow(FlowNode::Expr(parent))]
                } else {
                    SmallVec::new()
                }
            }
            // A key stored by `m[k] = v` lives as long as the container.
            NodeKind::Index { index, .. } if *index == child => {
                match ast.parent_skipping_parens(parent).map(|(p, c)| (p, c, ast.kind(p))) {
                    Some((assign, c, NodeKind::Assign { target, .. })) if *target == c => {
                        match ast.root_identifier(parent).and_then(|r| symbols.resolve(r)) {
                            Some(var) => smallvec![Step::effect(Effect::Container {
                                scope: symbols.var(var).scope,
                                write: assign,
                            })],
                            None => smallvec![Step::effect(Effect::Global)],
                        }
                    }
                    _ => SmallVec::new(),
                }
            }
            NodeKind::Array { .. } => smallvec![Step::flow(FlowNode::Expr(parent))],
            NodeKind::Property { .. } => match ast.parent(parent) {
                Some(object) => smallvec![Step::flow(FlowNode::Expr(object))],
                None => SmallVec::new(),
            },
            _ => SmallVec::new(),
        }
    }

    fn assignment(&self, assign: NodeId, target: NodeId) -> SmallVec<[Step; 4]> {
        let ast = self.ast;
        let symbols = self.types.symbols();
        let target = ast.unparen(target);
        let mut steps = SmallVec::new();
        match ast.kind(target) {
            NodeKind::Ident { .. } => {
                if let Some(var) = symbols.resolve(target) {
                    steps.push(Step::with(
                        FlowNode::Var(var),
                        Effect::Scope(symbols.var(var).scope),
                    ));
                    steps.push(Step::effect(Effect::NotSimple));
                }
            }
            _ => match ast.root_identifier(target).and_then(|r| symbols.resolve(r)) {
                Some(var) => steps.push(Step::with(
                    FlowNode::Var(var),
                    Effect::Container {
                        scope: symbols.var(var).scope,
                        write: assign,
                    },
                )),
                None => steps.push(Step::effect(Effect::Global)),
            },
        }
        steps.push(Step::flow(FlowNode::Expr(assign)));
        steps
    }

    /// A returned value lands at every call of the function.
    fn returned(&self, ret: NodeId) -> SmallVec<[Step; 4]> {
        let ast = self.ast;
        let symbols = self.types.symbols();
        let Some(function) = scope::enclosing_function(ast, ret) else {
            return SmallVec::new();
        };
        let Some(var) = symbols.declared_by(function) else {
            return SmallVec::new();
        };
        let calls: SmallVec<[Step; 4]> = symbols
            .var(var)
            .references
            .iter()
            .filter_map(|&r| {
                let (parent, child) = ast.parent_skipping_parens(r)?;
                match ast.kind(parent) {
                    NodeKind::Call { callee, .. } if *callee == child => Some(Step::with(
                        FlowNode::Expr(parent),
                        Effect::Scope(parent),
                    )),
                    _ => None,
                }
            })
            .collect();
        if calls.is_empty() {
            smallvec![Step::effect(Effect::Scope(function))]
        } else {
            calls
        }
    }

    fn argument(&self, call: NodeId, callee: NodeId, index: usize) -> SmallVec<[Step; 4]> {
        let ast = self.ast;
        let symbols = self.types.symbols();

        if let Some(function) = symbols.called_function(ast, callee) {
            let declaration = symbols.var(function).declaration;
            return match symbols.params_of(ast, declaration).get(index) {
                Some(&param) => smallvec![Step::with(
                    FlowNode::Var(param),
                    Effect::Scope(declaration)
                )],
                None => SmallVec::new(),
            };
        }

        let Some(site) = CallSite::from_node(ast, self.interner, call) else {
            return SmallVec::new();
        };
        match self.calls.escape_target(ast, self.types, &site, index) {
            EscapeTarget::None => SmallVec::new(),
            EscapeTarget::Result => smallvec![Step::flow(FlowNode::Expr(call))],
            EscapeTarget::Global => smallvec![Step::effect(Effect::Global)],
            EscapeTarget::Receiver => {
                let owner = site
                    .receiver
                    .and_then(|r| ast.root_identifier(r))
                    .and_then(|r| symbols.resolve(r));
                match owner {
                    Some(var) => smallvec![Step::with(
                        FlowNode::Var(var),
                        Effect::Container {
                            scope: symbols.var(var).scope,
                            write: call,
                        }
                    )],
                    None => smallvec![Step::effect(Effect::Global)],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
