use thiserror::Error;

use grove_diagnostic::{Diagnostic, ErrorCode};
use grove_ir::Span;

/// Failure to register or build a transform.
///
/// None of these stop a compilation; the pipeline turns them into
/// diagnostics with [`TransformError::to_diagnostic`] and skips the
/// transform.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TransformError {
    #[error("could not instantiate transform `{name}`: {reason}")]
    Instantiation { name: String, reason: String },

    #[error("transform `{name}` is already registered")]
    Duplicate { name: String },

    #[error("`{name}` is not a registered transform")]
    Unknown { name: String },
}

impl TransformError {
    pub fn instantiation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::Instantiation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TransformError::Instantiation { .. } => ErrorCode::E0101,
            TransformError::Duplicate { .. } => ErrorCode::E0104,
            TransformError::Unknown { .. } => ErrorCode::E0105,
        }
    }

    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(span, "required here")
    }
}
