use thiserror::Error;
use ts2c_diagnostic::{Diagnostic, ErrorCode};

/// Inference failures that abort compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("type inference did not converge after {iterations} iterations")]
    FixpointDiverged { iterations: usize },
}

impl InferenceError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InferenceError::FixpointDiverged { iterations } => Diagnostic::error(ErrorCode::E9002)
                .with_message(self.to_string())
                .with_note(format!(
                    "a value's type kept growing for {iterations} passes, \
                     usually because a container is stored inside itself"
                )),
        }
    }
}
