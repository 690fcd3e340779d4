use thiserror::Error;
use ts2c_diagnostic::{Diagnostic, ErrorCode};

/// Code generation failures that abort compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    /// A header key was required but nothing registered an implementation.
    #[error("no header implementation registered for `{key}`")]
    MissingHeader { key: String, required_by: Option<String> },
}

impl CodegenError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CodegenError::MissingHeader { required_by, .. } => {
                let diag = Diagnostic::error(ErrorCode::E9001).with_message(self.to_string());
                match required_by {
                    Some(owner) => diag.with_note(format!("required by header `{owner}`")),
                    None => diag.with_note("required while lowering the program"),
                }
                .with_suggestion("add a preset that provides this header")
            }
        }
    }
}
