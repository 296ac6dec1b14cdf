//! The transform plugin contract.

use grove_diagnostic::Diagnostic;
use grove_types::{AnnotationNode, ClassGraph, ClassId, MemberRef};

use crate::{CompilePhase, SourceUnit};

/// What a transform is invoked on.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformTarget {
    /// A local transform: the triggering annotation occurrence and the node
    /// it annotates.
    Annotated {
        annotation: AnnotationNode,
        node: MemberRef,
    },
    /// A global transform: the whole source unit.
    Unit,
}

impl TransformTarget {
    /// Class owning the annotated node.
    pub fn owner(&self) -> Option<ClassId> {
        match self {
            TransformTarget::Annotated { node, .. } => Some(node.owner()),
            TransformTarget::Unit => None,
        }
    }
}

/// Everything a transform may read or rewrite.
pub struct TransformContext<'a> {
    pub graph: &'a mut ClassGraph,
    pub unit: &'a mut SourceUnit,
    pub phase: CompilePhase,
}

impl TransformContext<'_> {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.unit.report(diagnostic);
    }
}

/// A tree rewrite run at a fixed compile phase.
///
/// Local transforms are triggered by an annotation whose definition carries
/// the transform marker; global transforms are listed in a service listing
/// and run once per source unit.
///
/// A transform may add members, annotations and classes. Annotations it
/// adds are not seen by the phase that is running.
pub trait AstTransformation {
    fn visit(&mut self, target: &TransformTarget, ctx: &mut TransformContext<'_>);
}

#[cfg(test)]
mod tests;
