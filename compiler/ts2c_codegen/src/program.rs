//! Assembly of the C translation unit.
//!
//! Layout: headers (includes, runtime, type definitions), globals,
//! prototypes, functions, bottoms, `main`.

use rustc_hash::FxHashMap;
use ts2c_diagnostic::Diagnostic;
use ts2c_ir::{Ast, StringInterner};
use ts2c_memory::MemoryPlan;
use ts2c_types::{NativeType, TypeTable};

use crate::context::CompilationContext;
use crate::error::CodegenError;
use crate::lower::memory::{collection_globals, collection_release, collection_setup};
use crate::lower::{local_declarations, LowerCx};
use crate::renderable;
use crate::template::render;

/// Generated C source plus the diagnostics lowering produced.
#[derive(Clone, Debug, PartialEq)]
pub struct CodegenOutput {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

renderable! {
    struct MainFunction = "int main(void) {\n    {setup}\n    {mains}\n    {body}\n    {releases}\n    {teardown}\n    return 0;\n}" {
        setup: Vec<String>,
        mains: Vec<String>,
        body: String,
        releases: Vec<String>,
        teardown: Vec<String>,
    }
}

renderable! {
    struct BottomFunction = "void {name}(void) {\n    {lines}\n}" {
        name: String,
        lines: Vec<String>,
    }
}

renderable! {
    struct ProgramLayout = "{sections {\n\n}=> {this}}\n" {
        sections: Vec<String>,
    }
}

/// Lower the whole program and lay out the C file.
///
/// # Errors
///
/// Fails when a required header has no registered implementation.
pub fn generate(
    ast: &Ast,
    interner: &StringInterner,
    types: &TypeTable,
    plan: &MemoryPlan,
    context: &CompilationContext,
) -> Result<CodegenOutput, CodegenError> {
    let root = ast.root();
    let mut cx = LowerCx::new(
        ast,
        interner,
        types,
        plan,
        context.resolvers(),
        context.lowering(),
    );
    for shape in types.structs() {
        cx.require_type(&NativeType::Struct(shape.clone()));
    }

    let body = cx.lower(root);
    let body = render(body.as_ref()).into_statements();
    let releases = cx.releases(root);
    let collections = plan.collections();
    cx.require_collections(collections);

    let mut globals = local_declarations(&mut cx, root);
    globals.extend(collection_globals(collections));

    let main = render(&MainFunction {
        setup: collection_setup(collections),
        mains: context.mains().iter().map(|main| main.render()).collect(),
        body,
        releases,
        teardown: collection_release(collections),
    })
    .into_statements();
    let bottoms = bottom_functions(context);

    let (headers, diagnostics, functions) = cx.into_parts();
    let headers = headers.resolve(context.headers())?;
    tracing::debug!(
        headers = headers.len(),
        globals = globals.len(),
        functions = functions.len(),
        "program assembled"
    );

    let mut sections = vec![
        join_headers(&headers),
        globals.join("\n"),
        functions
            .iter()
            .map(|function| function.prototype.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        functions
            .iter()
            .map(|function| function.definition.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
        bottoms.join("\n\n"),
        main,
    ];
    sections.retain(|section| !section.trim().is_empty());
    let code = render(&ProgramLayout { sections }).into_statements();
    Ok(CodegenOutput { code, diagnostics })
}

/// One `void name(void)` per bottom name, collecting every contribution
/// in registration order.
fn bottom_functions(context: &CompilationContext) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut lines: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for bottom in context.bottoms() {
        let name = bottom.name().to_string();
        if !lines.contains_key(&name) {
            order.push(name.clone());
        }
        lines.entry(name).or_default().push(bottom.render());
    }
    order
        .into_iter()
        .map(|name| {
            let lines = lines.remove(&name).unwrap_or_default();
            render(&BottomFunction { name, lines }).into_statements()
        })
        .collect()
}

/// Consecutive one-line directives stay together; other headers are
/// separated by a blank line.
fn join_headers(headers: &[String]) -> String {
    let mut out = String::new();
    let mut previous_directive = false;
    for header in headers {
        let directive = !header.contains('\n')
            && (header.starts_with("#include") || header.starts_with("#define"));
        if !out.is_empty() {
            out.push_str(if directive && previous_directive {
                "\n"
            } else {
                "\n\n"
            });
        }
        out.push_str(header);
        previous_directive = directive;
    }
    out
}

#[cfg(test)]
mod tests;
