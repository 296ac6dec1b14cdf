//! Compile phases, in execution order.

use std::fmt;

/// A phase of one compilation. Phases run in declaration order; a transform
/// declares the phase it runs in.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CompilePhase {
    Initialization,
    Parsing,
    Conversion,
    SemanticAnalysis,
    Canonicalization,
    InstructionSelection,
    ClassGeneration,
    Output,
    Finalization,
}

impl CompilePhase {
    pub const ALL: [CompilePhase; 9] = [
        CompilePhase::Initialization,
        CompilePhase::Parsing,
        CompilePhase::Conversion,
        CompilePhase::SemanticAnalysis,
        CompilePhase::Canonicalization,
        CompilePhase::InstructionSelection,
        CompilePhase::ClassGeneration,
        CompilePhase::Output,
        CompilePhase::Finalization,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompilePhase::Initialization => "initialization",
            CompilePhase::Parsing => "parsing",
            CompilePhase::Conversion => "conversion",
            CompilePhase::SemanticAnalysis => "semantic analysis",
            CompilePhase::Canonicalization => "canonicalization",
            CompilePhase::InstructionSelection => "instruction selection",
            CompilePhase::ClassGeneration => "class generation",
            CompilePhase::Output => "output",
            CompilePhase::Finalization => "finalization",
        }
    }

    /// Parse the `SCREAMING_CASE` spelling used in annotation members and
    /// service listings (`SEMANTIC_ANALYSIS`).
    pub fn from_constant(s: &str) -> Option<Self> {
        Some(match s {
            "INITIALIZATION" => CompilePhase::Initialization,
            "PARSING" => CompilePhase::Parsing,
            "CONVERSION" => CompilePhase::Conversion,
            "SEMANTIC_ANALYSIS" => CompilePhase::SemanticAnalysis,
            "CANONICALIZATION" => CompilePhase::Canonicalization,
            "INSTRUCTION_SELECTION" => CompilePhase::InstructionSelection,
            "CLASS_GENERATION" => CompilePhase::ClassGeneration,
            "OUTPUT" => CompilePhase::Output,
            "FINALIZATION" => CompilePhase::Finalization,
            _ => return None,
        })
    }

    /// The phase after this one, if any.
    pub fn next(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|&p| p == self)?;
        Self::ALL.get(index + 1).copied()
    }
}

impl fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
