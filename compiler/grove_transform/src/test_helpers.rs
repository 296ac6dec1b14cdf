//! Fixtures for transform tests: a class graph with the transform marker
//! declared, and transforms that record their invocations.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use grove_ir::Span;
use grove_types::{AnnotationId, AnnotationValue, ClassGraph, ClassId, FieldNode, MemberRef, Modifiers};

use crate::{AstTransformation, SourceUnit, TransformContext, TransformError, TransformTarget, TRANSFORM_MARKER};

/// Invocations recorded by [`Recorder`], as `transform:target`.
pub(crate) type Log = Arc<Mutex<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Arc::default()
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records each invocation; optionally runs `action` afterwards.
pub(crate) struct Recorder {
    name: &'static str,
    log: Log,
    action: Option<fn(&TransformTarget, &mut TransformContext<'_>)>,
}

impl AstTransformation for Recorder {
    fn visit(&mut self, target: &TransformTarget, ctx: &mut TransformContext<'_>) {
        let what = match target {
            TransformTarget::Annotated { annotation, node } => {
                format!("{}@{}", describe(ctx.graph, *node), annotation.id.raw())
            }
            TransformTarget::Unit => ctx.unit.name().to_owned(),
        };
        self.log.lock().unwrap().push(format!("{}:{what}", self.name));
        if let Some(action) = self.action {
            action(target, ctx);
        }
    }
}

fn describe(graph: &ClassGraph, node: MemberRef) -> String {
    match node {
        MemberRef::Class(id) => graph.name_str(id).to_owned(),
        MemberRef::Method(r) => graph.lookup(graph.method_node(r).name).to_owned(),
        MemberRef::Field(r) => graph.lookup(graph.field_node(r).name).to_owned(),
        MemberRef::Constructor(r) => format!("<init>#{}", r.index),
        MemberRef::Property(r) => graph.lookup(graph.property_node(r).name()).to_owned(),
    }
}

pub(crate) fn recorder(
    name: &'static str,
    log: &Log,
) -> impl Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync + 'static {
    recorder_with(name, log, None)
}

pub(crate) fn recorder_with(
    name: &'static str,
    log: &Log,
    action: Option<fn(&TransformTarget, &mut TransformContext<'_>)>,
) -> impl Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move || {
        Ok(Box::new(Recorder {
            name,
            log: Arc::clone(&log),
            action,
        }) as Box<dyn AstTransformation>)
    }
}

/// Factory that always fails.
pub(crate) fn broken(
    name: &'static str,
) -> impl Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync + 'static {
    move || Err(TransformError::instantiation(name, "constructor panicked"))
}

/// A class graph with the transform marker declared, plus one source unit.
pub(crate) struct Fixture {
    pub graph: ClassGraph,
    pub unit: SourceUnit,
    pub marker: ClassId,
    next_span: u32,
}

impl Fixture {
    pub fn new() -> Self {
        let mut graph = ClassGraph::new();
        let marker = graph.class(TRANSFORM_MARKER).annotation().declare();
        Fixture {
            graph,
            unit: SourceUnit::new("Test.grove"),
            marker,
            next_span: 0,
        }
    }

    /// Declare an annotation definition whose marker names `transforms`.
    pub fn trigger(&mut self, name: &str, transforms: &[&str]) -> ClassId {
        let value = match transforms {
            [single] => AnnotationValue::Str((*single).to_owned()),
            many => AnnotationValue::List(many.iter().map(|t| AnnotationValue::Str((*t).to_owned())).collect()),
        };
        self.trigger_with(name, Some(value))
    }

    /// Declare an annotation definition whose marker carries `value` as is.
    pub fn trigger_with(&mut self, name: &str, value: Option<AnnotationValue>) -> ClassId {
        let definition = self.graph.class(name).annotation().declare();
        let mut marker = self.graph.new_annotation(self.marker, Span::DUMMY);
        if let Some(value) = value {
            marker = marker.with_member(self.graph.intern("value"), value);
        }
        self.graph.add_annotation(MemberRef::Class(definition), marker);
        definition
    }

    /// Declare a class in the unit.
    pub fn class(&mut self, name: &str) -> ClassId {
        let class = self.graph.class(name).declare();
        self.unit.add_class(class);
        class
    }

    pub fn field(&mut self, class: ClassId, name: &str) -> MemberRef {
        let field = FieldNode::new(self.graph.intern(name), Modifiers::PRIVATE, ClassId::INT);
        MemberRef::Field(self.graph.add_field(class, field))
    }

    /// Attach an occurrence of `annotation` to `target`, at a fresh span.
    pub fn annotate(&mut self, target: MemberRef, annotation: ClassId) -> AnnotationId {
        annotate(&mut self.graph, target, annotation, &mut self.next_span)
    }
}

fn annotate(graph: &mut ClassGraph, target: MemberRef, annotation: ClassId, next_span: &mut u32) -> AnnotationId {
    *next_span += 10;
    let node = graph.new_annotation(annotation, Span::new(*next_span, *next_span + 5));
    let id = node.id;
    graph.add_annotation(target, node);
    id
}

/// Transform action: add a field `generated` carrying the first annotation
/// definition named `Trigger` found in the graph.
pub(crate) fn add_annotated_field(target: &TransformTarget, ctx: &mut TransformContext<'_>) {
    let Some(owner) = target.owner() else {
        return;
    };
    let Some(trigger) = ctx.graph.find_class("Trigger") else {
        return;
    };
    let name = ctx.graph.intern("generated");
    if ctx.graph.declared_field(owner, name).is_some() {
        return;
    }
    let field = ctx.graph.add_field(owner, FieldNode::new(name, Modifiers::PRIVATE, ClassId::INT));
    let mut span = 1000;
    annotate(ctx.graph, MemberRef::Field(field), trigger, &mut span);
}
