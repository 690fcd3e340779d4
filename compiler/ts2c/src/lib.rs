//! The ts2c compiler.
//!
//! ```text
//! source
//!   │ ts2c_parse::parse_source
//!   ▼
//! Ast ──► ts2c_types::infer_types ──► TypeTable
//!   │                                   │
//!   ▼                                   ▼
//! ts2c_memory::plan_memory ──────► MemoryPlan
//!   │
//!   ▼
//! ts2c_codegen::generate ──► C source
//! ```
//!
//! Each call to [`compile`] builds its own [`CompilationContext`] from the
//! requested presets; nothing is shared between compilations.

use std::rc::Rc;
use std::sync::Once;

use thiserror::Error;
use ts2c_codegen::{CodegenError, CompilationContext, Preset};
use ts2c_diagnostic::{has_errors, Diagnostic};
use ts2c_ir::StringInterner;
use ts2c_types::{InferOptions, InferenceError};

pub use ts2c_codegen as codegen;
pub use ts2c_diagnostic as diagnostic;

/// Settings for one compilation.
#[derive(Clone, Default)]
pub struct CompileOptions {
    /// Used in diagnostics only.
    pub file_path: Option<String>,
    /// Platform presets, applied in order; later ones win.
    pub presets: Vec<Rc<dyn Preset>>,
    /// Overrides the inference pass limit.
    pub max_fixpoint_iterations: Option<usize>,
}

/// Result of a compilation that did not abort.
#[derive(Clone, Debug, PartialEq)]
pub struct CompileOutput {
    /// Generated C; empty when the source did not parse.
    pub code: String,
    /// Parser, inference and lowering diagnostics, in that order.
    pub diagnostics: Vec<Diagnostic>,
    /// No diagnostic is an error.
    pub success: bool,
}

/// Failures that stop compilation without output.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Inference(err) => err.to_diagnostic(),
            CompileError::Codegen(err) => err.to_diagnostic(),
        }
    }
}

/// Compile `source` to C.
///
/// Parse errors stop the pipeline early and are returned as diagnostics
/// with no code. Lowering problems produce placeholder code alongside
/// their diagnostics.
#[tracing::instrument(level = "debug", skip_all, fields(file = options.file_path.as_deref()))]
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(source, &interner);
    let mut diagnostics = parsed.diagnostics();
    if parsed.has_errors() {
        tracing::debug!(errors = diagnostics.len(), "parse failed");
        return Ok(CompileOutput {
            code: String::new(),
            diagnostics,
            success: false,
        });
    }
    let ast = parsed.ast;

    let context = CompilationContext::with_presets(&options.presets);
    let infer_options = InferOptions {
        max_iterations: options.max_fixpoint_iterations,
    };
    let inferred = ts2c_types::infer_types(&ast, &interner, context.resolvers(), &infer_options)?;
    diagnostics.extend(inferred.diagnostics);

    let plan = ts2c_memory::plan_memory(&ast, &interner, &inferred.table, context.resolvers());
    let generated = ts2c_codegen::generate(&ast, &interner, &inferred.table, &plan, &context)?;
    diagnostics.extend(generated.diagnostics);

    let success = !has_errors(&diagnostics);
    tracing::debug!(
        success,
        diagnostics = diagnostics.len(),
        bytes = generated.code.len(),
        "compiled"
    );
    Ok(CompileOutput {
        code: generated.code,
        diagnostics,
        success,
    })
}

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set.
///
/// `TS2C_LOG_TREE=1` switches to an indented, span-nested layout. Safe to
/// call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("TS2C_LOG_TREE").is_ok_and(|value| value == "1") {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
