//! Diagnostic system for the ts2c compiler.
//!
//! Every reportable problem carries:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary span saying where
//! - optional notes and suggestions
//!
//! Diagnostics are plain values. Phases return them alongside their output;
//! only fatal conditions (missing platform headers, a diverging inference
//! fixpoint) abort compilation, and those are typed errors in the crates
//! that raise them.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;

/// Count errors in a diagnostic list.
pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

/// Does the list contain at least one error?
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
