use std::fmt;

/// Error codes for recoverable compiler diagnostics.
///
/// Format: E#### where the first two digits name the subsystem:
/// - E01xx: AST transform pipeline
/// - E09xx: diagnostic machinery itself
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Transform pipeline (E01xx)
    /// Transform could not be instantiated
    E0101,
    /// Transform declared for a phase earlier than allowed
    E0102,
    /// Malformed member on a transform marker annotation
    E0103,
    /// Duplicate or conflicting transform registration
    E0104,
    /// Named class is not a valid transform
    E0105,

    // Diagnostic machinery (E09xx)
    /// Error limit reached
    E0901,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0101 => "E0101",
            ErrorCode::E0102 => "E0102",
            ErrorCode::E0103 => "E0103",
            ErrorCode::E0104 => "E0104",
            ErrorCode::E0105 => "E0105",
            ErrorCode::E0901 => "E0901",
        }
    }

    /// Short description used in `--explain`-style listings.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E0101 => "transform could not be instantiated",
            ErrorCode::E0102 => "transform phase is earlier than allowed",
            ErrorCode::E0103 => "malformed transform annotation member",
            ErrorCode::E0104 => "duplicate or conflicting transform registration",
            ErrorCode::E0105 => "class is not a valid transform",
            ErrorCode::E0901 => "error limit reached",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
