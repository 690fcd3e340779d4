//! The inference engine: collect promises, then iterate to a fixpoint.
//!
//! ```text
//! collect ─▶ promises ─▶ solve (repeat until no best changes) ─▶ finalize
//!                              │                                    │
//!                     ExprTyper::infer(source)               TypeTable
//! ```
//!
//! Each pass re-evaluates every promise with the current variable types and
//! merges the result into the promise's `best`; the subject variable's type
//! is recomputed right away so later promises in the same pass see it.
//! Both only move up the merge lattice.

mod collect;
mod expr;

use expr::ExprTyper;

use rustc_hash::{FxHashMap, FxHashSet};
use ts2c_diagnostic::{Diagnostic, ErrorCode};
use ts2c_ir::{Ast, NodeKind, StringInterner};

use crate::promise::{PathSeg, PromiseKind, TypePromise};
use crate::{
    merge, merge_with_conflict, CallOracle, InferenceError, NativeType, SymbolTable, TypeOverrides,
    TypeTable, VarId, VarKind,
};

/// Knobs for [`infer_types`].
#[derive(Clone, Debug, Default)]
pub struct InferOptions {
    /// Pass limit; defaults to `8 * (variables + 2)`.
    pub max_iterations: Option<usize>,
}

/// Result of inference.
#[derive(Debug)]
pub struct InferOutput {
    pub table: TypeTable,
    /// Unresolved identifiers and boxed conflicts.
    pub diagnostics: Vec<Diagnostic>,
}

/// Infer a type for every variable and expression of `ast`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn infer_types(
    ast: &Ast,
    interner: &StringInterner,
    oracle: &dyn CallOracle,
    options: &InferOptions,
) -> Result<InferOutput, InferenceError> {
    let mut engine = Engine::new(ast, interner, oracle);
    let passes = engine.solve(options.max_iterations)?;
    tracing::debug!(
        passes,
        variables = engine.symbols.len(),
        promises = engine.promises.len(),
        "type fixpoint reached"
    );
    engine.report_conflicts();
    Ok(engine.finish())
}

pub(crate) struct Engine<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
    oracle: &'a dyn CallOracle,
    pub(crate) symbols: SymbolTable,
    pub(crate) promises: Vec<TypePromise>,
    by_subject: FxHashMap<VarId, Vec<usize>>,
    escaped: FxHashSet<VarId>,
    overrides: TypeOverrides,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(ast: &'a Ast, interner: &'a StringInterner, oracle: &'a dyn CallOracle) -> Self {
        let symbols = SymbolTable::build(ast, interner);
        let collected = collect::collect(ast, interner, &symbols, oracle);

        let mut by_subject: FxHashMap<VarId, Vec<usize>> = FxHashMap::default();
        for (index, promise) in collected.promises.iter().enumerate() {
            by_subject.entry(promise.subject).or_default().push(index);
        }

        let mut engine = Engine {
            ast,
            interner,
            oracle,
            symbols,
            promises: collected.promises,
            by_subject,
            escaped: collected.escaped,
            overrides: collected.overrides,
            diagnostics: collected.diagnostics,
        };
        let initial: Vec<(VarId, NativeType)> = engine
            .symbols
            .vars()
            .map(|(var, _)| (var, engine.fold(var)))
            .collect();
        for (var, ty) in initial {
            engine.symbols.var_mut(var).ty = ty;
        }
        engine
    }

    fn typer(&self) -> ExprTyper<'_> {
        ExprTyper {
            ast: self.ast,
            interner: self.interner,
            oracle: self.oracle,
            symbols: &self.symbols,
            overrides: &self.overrides,
        }
    }

    /// Iterate until no promise improves. Returns the number of passes,
    /// counting the final pass that changed nothing.
    pub(crate) fn solve(&mut self, max_iterations: Option<usize>) -> Result<usize, InferenceError> {
        let cap = max_iterations.unwrap_or(8 * (self.symbols.len() + 2));
        let mut passes = 0;
        loop {
            passes += 1;
            let changed = self.pass();
            tracing::trace!(pass = passes, changed, "inference pass");
            if !changed {
                return Ok(passes);
            }
            if passes >= cap {
                return Err(InferenceError::FixpointDiverged { iterations: passes });
            }
        }
    }

    fn pass(&mut self) -> bool {
        let mut changed = false;
        for index in 0..self.promises.len() {
            let evaluated = self.evaluate(&self.promises[index]);
            let promise = &mut self.promises[index];
            let best = merge(&promise.best, &evaluated);
            if best == promise.best {
                continue;
            }
            promise.best = best;
            changed = true;

            let subject = promise.subject;
            let ty = self.fold(subject);
            self.symbols.var_mut(subject).ty = ty;
        }
        changed
    }

    /// Current contribution of one promise to its subject's type.
    fn evaluate(&self, promise: &TypePromise) -> NativeType {
        let typer = self.typer();
        let ty = match promise.kind {
            PromiseKind::Direct | PromiseKind::ReturnOf | PromiseKind::ParamAtCallSite => {
                typer.infer(promise.source)
            }
            PromiseKind::ForOfElement => match typer.infer(promise.source) {
                NativeType::Array(a) => a.element,
                NativeType::Dict(e) => *e,
                ty if ty.is_str() => NativeType::STR,
                _ => NativeType::POINTER,
            },
            PromiseKind::ForInKey => NativeType::STR,
            PromiseKind::PushElement => {
                let args: Vec<NativeType> = match self.ast.kind(promise.source) {
                    NodeKind::Call { args, .. } => {
                        args.iter().map(|&a| typer.infer(a).dynamize()).collect()
                    }
                    _ => Vec::new(),
                };
                NativeType::array(crate::merge_all(&args), 0, true)
            }
            PromiseKind::Resized => NativeType::array(NativeType::POINTER, 0, true),
            PromiseKind::KeyEnumeration => NativeType::dict(NativeType::POINTER),
            PromiseKind::PropertyWrite | PromiseKind::DictValue => {
                let leaf = typer.infer(promise.source).dynamize();
                promise.path.iter().rev().fold(leaf, |inner, seg| match seg {
                    PathSeg::Field(name) => {
                        NativeType::structure([(self.interner.lookup(*name), inner)])
                    }
                    PathSeg::Index(key) if typer.infer(*key).is_str() => NativeType::dict(inner),
                    PathSeg::Index(_) => NativeType::array(inner, 0, false),
                })
            }
        };
        if promise.flows {
            ty.dynamize()
        } else {
            ty
        }
    }

    /// Merge-reduction of a variable's promises.
    fn fold(&self, var: VarId) -> NativeType {
        let promises = self.by_subject.get(&var).map_or(&[][..], Vec::as_slice);
        if promises.is_empty() && self.symbols.var(var).kind == VarKind::Function {
            return NativeType::VOID;
        }
        let ty = promises
            .iter()
            .fold(NativeType::POINTER, |acc, &i| merge(&acc, &self.promises[i].best));
        let ty = if self.escaped.contains(&var) {
            ty.dynamize()
        } else {
            ty
        };
        close_empty_arrays(ty)
    }

    fn report_conflicts(&mut self) {
        for (var, info) in self.symbols.vars() {
            let Some(promises) = self.by_subject.get(&var) else {
                continue;
            };
            let mut acc = NativeType::POINTER;
            let mut conflict = false;
            for &i in promises {
                let (merged, c) = merge_with_conflict(&acc, &self.promises[i].best);
                acc = merged;
                conflict |= c;
            }
            if conflict {
                let name = self.interner.lookup(info.name);
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E2002)
                        .with_message(format!("`{name}` holds values of incompatible types"))
                        .with_label(self.ast.span(info.declaration), "declared here")
                        .with_note("a boxed `struct js_var` has no C operations")
                        .with_suggestion("use a separate variable for each type"),
                );
            }
        }
    }

    fn finish(self) -> InferOutput {
        let typer = self.typer();
        let node_types: Vec<NativeType> = self.ast.ids().map(|id| typer.infer(id)).collect();
        let table = TypeTable::new(self.symbols, node_types, self.overrides);
        InferOutput {
            table,
            diagnostics: self.diagnostics,
        }
    }
}

/// A static array nobody gave a size to has to grow.
fn close_empty_arrays(ty: NativeType) -> NativeType {
    match ty {
        NativeType::Array(a) if !a.dynamic && a.capacity == 0 => {
            NativeType::array(a.element, 0, true)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests;
