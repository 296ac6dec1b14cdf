//! Finds the annotation occurrences that trigger local transforms.
//!
//! An annotation triggers a transform when its definition is itself
//! annotated with the transform marker:
//!
//! ```text
//! @GroveTransformationClass("com.example.ToStringTransform")
//! @interface ToString {}
//!
//! @ToString
//! class Person {}      // triggers com.example.ToStringTransform
//! ```
//!
//! The marker's `value` names the transforms, as a string, a class, or a
//! list of either. Problems with the marker or the named transform are
//! reported against the triggering annotation and the occurrence is
//! skipped.

use grove_diagnostic::{Diagnostic, ErrorCode};
use grove_ir::Name;
use grove_types::{AnnotationNode, AnnotationValue, ClassGraph, ClassId, MemberRef};

use crate::{PipelineConfig, SourceUnit, TransformError, TransformRegistry};

/// Qualified name of the marker annotation that ties an annotation
/// definition to its transforms.
pub const TRANSFORM_MARKER: &str = "grove.transform.GroveTransformationClass";

/// Walks a unit's classes and records, per phase, which transforms each
/// annotation occurrence triggers.
pub struct AnnotationCollector<'a> {
    registry: &'a TransformRegistry,
    config: &'a PipelineConfig,
}

impl<'a> AnnotationCollector<'a> {
    pub fn new(registry: &'a TransformRegistry, config: &'a PipelineConfig) -> Self {
        AnnotationCollector { registry, config }
    }

    /// Examine every annotation occurrence in `unit` not examined before.
    /// Returns the number of triggers recorded.
    #[tracing::instrument(level = "debug", skip_all, fields(unit = unit.name()))]
    pub fn collect(&self, graph: &ClassGraph, unit: &mut SourceUnit) -> usize {
        let value = graph.intern("value");
        let mut recorded = 0;
        let classes = unit.classes().to_vec();
        for class in classes {
            for node in graph.annotatable_nodes(class) {
                for annotation in graph.annotations(node) {
                    if !unit.triggers.examine(annotation.id) {
                        continue;
                    }
                    let Some(marker) = transform_marker(graph, annotation.class) else {
                        continue;
                    };
                    match transform_names(graph, marker, value) {
                        Ok(names) => {
                            for name in names {
                                recorded += usize::from(self.schedule(&name, annotation, node, unit));
                            }
                        }
                        Err(reason) => {
                            unit.report(malformed_marker(graph, annotation, &reason));
                        }
                    }
                }
            }
        }
        tracing::debug!(recorded, "annotations collected");
        recorded
    }

    fn schedule(&self, name: &str, annotation: &AnnotationNode, node: MemberRef, unit: &mut SourceUnit) -> bool {
        let Some(entry) = self.registry.get(name) else {
            let error = TransformError::Unknown { name: name.to_owned() };
            unit.report(error.to_diagnostic(annotation.span));
            return false;
        };
        let min = self.config.min_local_phase;
        if entry.phase() < min {
            tracing::debug!(transform = name, phase = %entry.phase(), "transform skipped");
            unit.report(
                Diagnostic::error(ErrorCode::E0102)
                    .with_message(format!(
                        "transform `{name}` is declared for {}, which is earlier than {min}",
                        entry.phase()
                    ))
                    .with_label(annotation.span, "triggered here")
                    .with_note(format!("annotation-triggered transforms run at {min} or later")),
            );
            return false;
        }
        tracing::trace!(transform = name, phase = %entry.phase(), ?node, "trigger recorded");
        unit.triggers.record(entry.phase(), annotation.id, name);
        true
    }
}

/// The marker on `annotation_class`'s definition, if it has one.
fn transform_marker(graph: &ClassGraph, annotation_class: ClassId) -> Option<&AnnotationNode> {
    graph
        .annotations(MemberRef::Class(annotation_class))
        .iter()
        .find(|a| graph.is_resolved(a.class) && graph.name_str(a.class) == TRANSFORM_MARKER)
}

/// Transform names carried by a marker's `value`.
fn transform_names(graph: &ClassGraph, marker: &AnnotationNode, value: Name) -> Result<Vec<String>, String> {
    let Some(member) = marker.member(value) else {
        return Err("the transform marker has no `value` member".to_owned());
    };
    let items = match member {
        AnnotationValue::List(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    if items.is_empty() {
        return Err("the transform marker names no transforms".to_owned());
    }
    items
        .iter()
        .map(|item| match item {
            AnnotationValue::Str(s) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
            AnnotationValue::Class(id) if graph.is_resolved(*id) => Ok(graph.name_str(*id).to_owned()),
            other => Err(format!(
                "the transform marker's `value` must name transforms, found {other:?}"
            )),
        })
        .collect()
}

fn malformed_marker(graph: &ClassGraph, annotation: &AnnotationNode, reason: &str) -> Diagnostic {
    let definition = if graph.is_resolved(annotation.class) {
        graph.name_str(annotation.class)
    } else {
        graph.lookup(graph.unresolved_name(annotation.class))
    };
    Diagnostic::error(ErrorCode::E0103)
        .with_message(format!("malformed transform annotation `{definition}`: {reason}"))
        .with_label(annotation.span, "used here")
}
