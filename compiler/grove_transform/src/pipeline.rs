//! The phase driver.

use grove_diagnostic::{Diagnostic, DiagnosticQueue};
use grove_ir::Span;
use grove_types::ClassGraph;

use crate::{
    AnnotationCollector, AstTransformation, CompilePhase, DiscoveryStage, GlobalTransforms, PipelineConfig,
    SourceUnit, TransformError, TransformRegistry, TransformVisitor,
};

/// Drives transforms over source units, one phase at a time.
///
/// For each phase, [`run_phase`](Self::run_phase):
/// 1. runs the global transforms scheduled for the phase,
/// 2. collects annotation triggers not seen before (from
///    `min_local_phase` on),
/// 3. runs the local transforms of the phase, class by class.
///
/// Registration and discovery problems are reported to the pipeline's own
/// queue; problems found in a unit go to the unit's queue.
pub struct TransformPipeline {
    config: PipelineConfig,
    registry: TransformRegistry,
    globals: GlobalTransforms,
    diagnostics: DiagnosticQueue,
}

impl TransformPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_registry(config, TransformRegistry::new())
    }

    pub fn with_registry(config: PipelineConfig, registry: TransformRegistry) -> Self {
        let diagnostics = DiagnosticQueue::with_config(config.diagnostics.clone());
        TransformPipeline {
            config,
            registry,
            globals: GlobalTransforms::new(),
            diagnostics,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn globals(&self) -> &GlobalTransforms {
        &self.globals
    }

    /// Register a transform. A duplicate name is reported (E0104) and the
    /// first registration kept; returns whether `factory` was registered.
    pub fn register<F>(&mut self, name: &str, phase: CompilePhase, factory: F) -> bool
    where
        F: Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync + 'static,
    {
        match self.registry.register(name, phase, factory) {
            Ok(()) => true,
            Err(error) => {
                self.diagnostics.add(error.to_diagnostic(Span::DUMMY));
                false
            }
        }
    }

    /// Scan a service listing for global transforms.
    pub fn discover_global(&mut self, listing: &str, stage: DiscoveryStage) -> usize {
        self.globals
            .discover(listing, stage, &self.registry, &self.config, &mut self.diagnostics)
    }

    /// Diagnostics from registration and discovery.
    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.flush()
    }

    /// Run `phase` over `unit`. A phase at or before the last one run over
    /// the unit is skipped.
    #[tracing::instrument(level = "debug", skip(self, graph, unit), fields(unit = unit.name()))]
    pub fn run_phase(&mut self, phase: CompilePhase, graph: &mut ClassGraph, unit: &mut SourceUnit) {
        if unit.last_phase.is_some_and(|last| last >= phase) {
            tracing::debug!(last = ?unit.last_phase, "phase already run");
            return;
        }
        unit.last_phase = Some(phase);

        let global = self.globals.run(phase, graph, unit);
        if phase >= self.config.min_local_phase {
            AnnotationCollector::new(&self.registry, &self.config).collect(graph, unit);
        }
        let local = TransformVisitor::new(&self.registry, phase).visit_unit(graph, unit);
        tracing::debug!(global, local, "phase complete");
    }

    /// Run every phase up to and including `last`, in order.
    pub fn run_through(&mut self, last: CompilePhase, graph: &mut ClassGraph, unit: &mut SourceUnit) {
        for phase in CompilePhase::ALL.into_iter().take_while(|&p| p <= last) {
            self.run_phase(phase, graph, unit);
        }
    }
}

#[cfg(test)]
mod tests;
