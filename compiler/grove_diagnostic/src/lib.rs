//! Diagnostic system for the Grove compiler.
//!
//! Two kinds of failure exist:
//!
//! - **Recoverable diagnostics** describe problems in user source (a
//!   malformed transform annotation, a transform declared for a phase that is
//!   too early). They are [`Diagnostic`] values collected in a
//!   [`DiagnosticQueue`]; compilation continues.
//! - **Internal errors** are broken compiler invariants (redirecting a
//!   primary class, a generics walk that dead-ends). They go through
//!   [`internal_error`] and unwind to the driver.

mod diagnostic;
mod error_code;
mod ice;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use ice::internal_error;
pub use queue::{too_many_errors, DiagnosticConfig, DiagnosticQueue};
