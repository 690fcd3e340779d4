//! Shared test utilities: run the front end and generate C.
//! Only compiled in test builds.

#![allow(clippy::unwrap_used)]

use ts2c_diagnostic::Diagnostic;
use ts2c_ir::StringInterner;
use ts2c_memory::plan_memory;
use ts2c_types::{infer_types, InferOptions};

use crate::{generate, CodegenError, CodegenOutput, CompilationContext};

/// Generate C for `source` with `context`.
pub(crate) fn try_generate(
    source: &str,
    context: &CompilationContext,
) -> Result<CodegenOutput, CodegenError> {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(source, &interner);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics());
    let ast = parsed.ast;
    let inferred = infer_types(&ast, &interner, context.resolvers(), &InferOptions::default()).unwrap();
    let plan = plan_memory(&ast, &interner, &inferred.table, context.resolvers());
    generate(&ast, &interner, &inferred.table, &plan, context)
}

/// Generated C for `source` with the standard context; lowering must not
/// report errors.
pub(crate) fn c_code(source: &str) -> String {
    let output = try_generate(source, &CompilationContext::new()).unwrap();
    let errors: Vec<&Diagnostic> = output.diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(errors.is_empty(), "{errors:?}\n{}", output.code);
    output.code
}

/// Diagnostics lowering reports for `source`.
pub(crate) fn lowering_diagnostics(source: &str) -> Vec<Diagnostic> {
    try_generate(source, &CompilationContext::new())
        .unwrap()
        .diagnostics
}

/// Assert every line of `expected` appears in `code`, in order.
#[track_caller]
pub(crate) fn assert_lines_in_order(code: &str, expected: &[&str]) {
    let mut rest = code;
    for line in expected {
        match rest.find(line) {
            Some(at) => rest = &rest[at + line.len()..],
            None => panic!("`{line}` missing (or out of order) in:\n{code}"),
        }
    }
}
