//! Collection: one walk over the program recording every type promise.

use rustc_hash::FxHashSet;
use ts2c_diagnostic::{Diagnostic, ErrorCode};
use ts2c_ir::{Ast, CallSite, NodeId, NodeKind, StringInterner};

use crate::promise::{PathSeg, PromiseKind, TypePromise};
use crate::{CallOracle, SymbolTable, TypeOverrides, VarId};

/// Globals every program may use without declaring them.
const WELL_KNOWN_GLOBALS: &[&str] = &[
    "console", "Math", "JSON", "parseInt", "parseFloat", "isNaN", "undefined", "NaN",
    "Infinity", "String", "Number", "Object", "Array", "Boolean",
];

/// Array methods that change the receiver's length.
const RESIZING_METHODS: &[&str] = &["pop", "shift", "splice"];

/// Array methods that insert their arguments into the receiver.
const INSERTING_METHODS: &[&str] = &["push", "unshift"];

#[derive(Default)]
pub(crate) struct Collected {
    pub promises: Vec<TypePromise>,
    /// Variables whose value is stored somewhere else as well.
    pub escaped: FxHashSet<VarId>,
    pub overrides: TypeOverrides,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) fn collect(
    ast: &Ast,
    interner: &StringInterner,
    symbols: &SymbolTable,
    oracle: &dyn CallOracle,
) -> Collected {
    let mut out = Collected::default();
    let mut cx = Collector {
        ast,
        interner,
        symbols,
        out: &mut out,
    };

    for id in ast.descendants(ast.root()) {
        if let Some(ty) = oracle.declare_types(ast, interner, id) {
            cx.out.overrides.insert(id, ty);
        }
        cx.visit(id, oracle);
    }

    tracing::trace!(promises = out.promises.len(), escaped = out.escaped.len(), "collected");
    out
}

struct Collector<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    symbols: &'a SymbolTable,
    out: &'a mut Collected,
}

impl Collector<'_> {
    fn visit(&mut self, id: NodeId, oracle: &dyn CallOracle) {
        match self.ast.kind(id) {
            NodeKind::Declarator {
                init: Some(init), ..
            } => {
                if let Some(var) = self.symbols.declared_by(id) {
                    let literal = matches!(
                        self.ast.kind(self.ast.unparen(*init)),
                        NodeKind::Array { .. } | NodeKind::Object { .. }
                    );
                    self.promise(TypePromise::new(var, PromiseKind::Direct, *init).flowing(!literal));
                }
                self.escapes(*init);
            }
            NodeKind::Assign { op, target, value } => self.assignment(id, op.is_some(), *target, *value),
            NodeKind::Return { value: Some(value) } => {
                if let Some(function) = ts2c_ir::scope::enclosing_function(self.ast, id)
                    .and_then(|f| self.symbols.declared_by(f))
                {
                    self.promise(TypePromise::new(function, PromiseKind::ReturnOf, *value));
                }
                self.escapes(*value);
            }
            NodeKind::Call { .. } => self.call(id),
            NodeKind::ForOf { left, right, .. } => {
                if let Some(var) = self.binding_of(*left) {
                    self.promise(TypePromise::new(var, PromiseKind::ForOfElement, *right));
                }
            }
            NodeKind::ForIn { left, right, .. } => {
                if let Some(var) = self.binding_of(*left) {
                    self.promise(TypePromise::new(var, PromiseKind::ForInKey, *right));
                }
                if let Some(var) = self.root_var(*right) {
                    self.promise(TypePromise::new(var, PromiseKind::KeyEnumeration, *right));
                }
            }
            NodeKind::Array { elements } => {
                for &element in elements {
                    self.escapes(element);
                }
            }
            NodeKind::Property { value, .. } => self.escapes(*value),
            NodeKind::Ident { name } => self.check_resolved(id, *name, oracle),
            _ => {}
        }
    }

    fn assignment(&mut self, id: NodeId, compound: bool, target: NodeId, value: NodeId) {
        let target = self.ast.unparen(target);
        match self.ast.kind(target) {
            NodeKind::Ident { .. } => {
                if let Some(var) = self.symbols.resolve(target) {
                    let source = if compound { id } else { value };
                    self.promise(TypePromise::new(var, PromiseKind::Direct, source).flowing(true));
                }
            }
            NodeKind::Member { .. } | NodeKind::Index { .. } => {
                if let Some((var, path)) = self.write_path(target) {
                    let kind = match path.last() {
                        Some(PathSeg::Index(_)) => PromiseKind::DictValue,
                        _ => PromiseKind::PropertyWrite,
                    };
                    let source = if compound { id } else { value };
                    self.promise(TypePromise::new(var, kind, source).with_path(path));
                }
            }
            _ => {}
        }
        if !compound {
            self.escapes(value);
        }
    }

    fn call(&mut self, id: NodeId) {
        let Some(site) = CallSite::from_node(self.ast, self.interner, id) else {
            return;
        };

        if let Some(function) = self.symbols.called_function(self.ast, site.callee) {
            let declaration = self.symbols.var(function).declaration;
            let params = self.symbols.params_of(self.ast, declaration);
            for (&param, &arg) in params.iter().zip(site.args.iter()) {
                // Recursion that hands a parameter straight back to itself
                // adds nothing.
                if self.symbols.resolve_expr(self.ast, arg) == Some(param) {
                    continue;
                }
                self.promise(TypePromise::new(param, PromiseKind::ParamAtCallSite, arg));
                self.escapes(arg);
            }
            return;
        }

        let (Some(method), Some(receiver)) = (site.method, site.receiver) else {
            return;
        };
        let Some(var) = self.root_var(receiver) else {
            return;
        };
        let direct = matches!(self.ast.kind(self.ast.unparen(receiver)), NodeKind::Ident { .. });
        if INSERTING_METHODS.contains(&method) && direct && !site.args.is_empty() {
            self.promise(TypePromise::new(var, PromiseKind::PushElement, id));
            for &arg in &site.args {
                self.escapes(arg);
            }
        } else if RESIZING_METHODS.contains(&method) && direct {
            self.promise(TypePromise::new(var, PromiseKind::Resized, id));
        }
    }

    /// Variable bound by a `for-of`/`for-in` left-hand side.
    fn binding_of(&self, left: NodeId) -> Option<VarId> {
        match self.ast.kind(left) {
            NodeKind::VarDecl { declarators, .. } => {
                declarators.first().and_then(|&d| self.symbols.declared_by(d))
            }
            _ => self.symbols.resolve_expr(self.ast, left),
        }
    }

    fn root_var(&self, expr: NodeId) -> Option<VarId> {
        self.ast
            .root_identifier(expr)
            .and_then(|ident| self.symbols.resolve(ident))
    }

    /// Root variable of `a.b[c].d` and the path below it.
    fn write_path(&self, target: NodeId) -> Option<(VarId, Vec<PathSeg>)> {
        let mut path = Vec::new();
        let mut current = target;
        loop {
            match self.ast.kind(current) {
                NodeKind::Member { object, property } => {
                    path.push(PathSeg::Field(*property));
                    current = self.ast.unparen(*object);
                }
                NodeKind::Index { object, index } => {
                    path.push(PathSeg::Index(*index));
                    current = self.ast.unparen(*object);
                }
                NodeKind::Ident { .. } => break,
                _ => return None,
            }
        }
        path.reverse();
        self.symbols.resolve(current).map(|var| (var, path))
    }

    /// Mark every variable whose value `expr` may hand over.
    fn escapes(&mut self, expr: NodeId) {
        let expr = self.ast.unparen(expr);
        match self.ast.kind(expr) {
            NodeKind::Ident { .. } => {
                if let Some(var) = self.symbols.resolve(expr) {
                    self.out.escaped.insert(var);
                }
            }
            NodeKind::Conditional {
                then_expr,
                else_expr,
                ..
            } => {
                self.escapes(*then_expr);
                self.escapes(*else_expr);
            }
            NodeKind::Assign {
                op: None, value, ..
            } => self.escapes(*value),
            _ => {}
        }
    }

    fn check_resolved(&mut self, id: NodeId, name: ts2c_ir::Name, oracle: &dyn CallOracle) {
        if self.symbols.resolve(id).is_some() {
            return;
        }
        let text = self.interner.lookup(name);
        if WELL_KNOWN_GLOBALS.contains(&text) || oracle.is_known_global(text) {
            return;
        }
        let is_callee = self
            .ast
            .parent_skipping_parens(id)
            .is_some_and(|(parent, child)| {
                matches!(self.ast.kind(parent), NodeKind::Call { callee, .. } if *callee == child)
            });
        if is_callee {
            return;
        }
        self.out.diagnostics.push(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("cannot find value `{text}` in this scope"))
                .with_label(self.ast.span(id), "not declared"),
        );
    }

    fn promise(&mut self, promise: TypePromise) {
        self.out.promises.push(promise);
    }
}
