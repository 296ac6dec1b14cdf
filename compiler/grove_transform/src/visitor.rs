//! Runs the local transforms of one phase over a class, in two passes.
//!
//! The collect pass walks the class body and gathers every (transform,
//! target) pair recorded for the phase into an owned list; the apply pass
//! then invokes each transform on its targets. Transforms may rewrite the
//! class freely during the apply pass: the walk is already over, and
//! whatever they add is not part of the list.

use rustc_hash::FxHashMap;

use grove_types::{ClassGraph, ClassId};

use crate::{AstTransformation, CompilePhase, SourceUnit, TransformContext, TransformRegistry, TransformTarget};

pub struct TransformVisitor<'a> {
    registry: &'a TransformRegistry,
    phase: CompilePhase,
}

impl<'a> TransformVisitor<'a> {
    pub fn new(registry: &'a TransformRegistry, phase: CompilePhase) -> Self {
        TransformVisitor { registry, phase }
    }

    /// Visit every class of `unit`. Returns the number of invocations.
    pub fn visit_unit(&self, graph: &mut ClassGraph, unit: &mut SourceUnit) -> usize {
        if !unit.triggers.has_phase(self.phase) {
            return 0;
        }
        let classes = unit.classes().to_vec();
        classes
            .into_iter()
            .map(|class| self.visit_class(graph, unit, class))
            .sum()
    }

    #[tracing::instrument(level = "debug", skip(self, graph, unit), fields(phase = %self.phase))]
    pub fn visit_class(&self, graph: &mut ClassGraph, unit: &mut SourceUnit, class: ClassId) -> usize {
        let targets = self.collect_targets(graph, unit, class);
        if targets.is_empty() {
            return 0;
        }

        // One instance per transform per class; `None` marks a transform that
        // failed to instantiate and was already reported.
        let mut instances: FxHashMap<String, Option<Box<dyn AstTransformation>>> = FxHashMap::default();
        let mut invoked = 0;
        for (name, target) in targets {
            let instance = instances.entry(name).or_insert_with_key(|name| {
                match self.registry.instantiate(name) {
                    Ok(instance) => Some(instance),
                    Err(error) => {
                        let span = match &target {
                            TransformTarget::Annotated { annotation, .. } => annotation.span,
                            TransformTarget::Unit => grove_ir::Span::DUMMY,
                        };
                        tracing::debug!(transform = %name, %error, "transform skipped");
                        unit.report(error.to_diagnostic(span));
                        None
                    }
                }
            });
            let Some(instance) = instance else {
                continue;
            };
            let mut ctx = TransformContext {
                graph: &mut *graph,
                unit: &mut *unit,
                phase: self.phase,
            };
            instance.visit(&target, &mut ctx);
            invoked += 1;
        }
        invoked
    }

    fn collect_targets(&self, graph: &ClassGraph, unit: &SourceUnit, class: ClassId) -> Vec<(String, TransformTarget)> {
        let mut targets = Vec::new();
        for node in graph.annotatable_nodes(class) {
            for annotation in graph.annotations(node) {
                for name in unit.triggers.transforms(self.phase, annotation.id) {
                    targets.push((
                        name.clone(),
                        TransformTarget::Annotated {
                            annotation: annotation.clone(),
                            node,
                        },
                    ));
                }
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests;
