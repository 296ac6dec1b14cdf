use rustc_hash::FxHashSet;

use grove_diagnostic::DiagnosticConfig;

use crate::CompilePhase;

/// Pipeline configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PipelineConfig {
    /// Earliest phase a local (annotation-triggered) transform may run in.
    /// Annotations are collected from this phase on.
    pub min_local_phase: CompilePhase,
    /// Earliest phase a global transform may run in.
    pub min_global_phase: CompilePhase,
    /// Global transforms skipped during discovery, by name.
    pub disabled_global_transforms: FxHashSet<String>,
    /// Settings for the pipeline's own diagnostic queue.
    pub diagnostics: DiagnosticConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            min_local_phase: CompilePhase::SemanticAnalysis,
            min_global_phase: CompilePhase::Conversion,
            disabled_global_transforms: FxHashSet::default(),
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn disable_global(mut self, name: impl Into<String>) -> Self {
        self.disabled_global_transforms.insert(name.into());
        self
    }

    pub fn is_global_disabled(&self, name: &str) -> bool {
        self.disabled_global_transforms.contains(name)
    }
}
