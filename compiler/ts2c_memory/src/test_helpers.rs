//! Shared test utilities for the planner, graph and tracker tests.
//! Only compiled in test builds.

#![allow(clippy::unwrap_used)]

use ts2c_ir::{Ast, CallSite, NodeId, NodeKind, StringInterner};
use ts2c_types::{infer_types, CallOracle, InferOptions, NativeType, TypeQuery, TypeTable};

use crate::{plan_memory, CallEscapes, EscapeTarget, MemoryPlan};

/// Standard calls the planner tests use.
pub(crate) struct TestCalls;

impl CallOracle for TestCalls {
    fn call_type(&self, _: &Ast, _: &dyn TypeQuery, site: &CallSite) -> Option<NativeType> {
        match site.method? {
            "push" => Some(NativeType::INT),
            "split" => Some(NativeType::array(NativeType::STR, 0, true)),
            "log" => Some(NativeType::VOID),
            _ => None,
        }
    }
}

impl CallEscapes for TestCalls {
    fn needs_disposal(&self, _: &Ast, _: &TypeTable, site: &CallSite) -> bool {
        site.is_method("split")
    }

    fn temp_var_name(&self, _: &Ast, _: &TypeTable, site: &CallSite) -> Option<String> {
        site.is_method("split").then(|| "tmp_split".to_string())
    }

    fn owns_contents(&self, _: &Ast, _: &TypeTable, site: &CallSite) -> bool {
        site.is_method("split")
    }

    fn escape_target(&self, _: &Ast, _: &TypeTable, site: &CallSite, _: usize) -> EscapeTarget {
        if site.is_qualified("console", "log") {
            EscapeTarget::None
        } else if site.is_method("push") {
            EscapeTarget::Receiver
        } else {
            EscapeTarget::Global
        }
    }
}

pub(crate) struct Planned {
    pub interner: StringInterner,
    pub ast: Ast,
    pub table: TypeTable,
    pub plan: MemoryPlan,
}

impl Planned {
    /// First node of a kind, in allocation order.
    pub(crate) fn find(&self, pred: impl Fn(&NodeKind) -> bool) -> NodeId {
        self.ast.ids().find(|&id| pred(self.ast.kind(id))).unwrap()
    }
}

pub(crate) fn plan(source: &str) -> Planned {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(source, &interner);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics());
    let ast = parsed.ast;
    let output = infer_types(&ast, &interner, &TestCalls, &InferOptions::default()).unwrap();
    let plan = plan_memory(&ast, &interner, &output.table, &TestCalls);
    Planned {
        interner,
        ast,
        table: output.table,
        plan,
    }
}
