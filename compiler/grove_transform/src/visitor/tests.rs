use super::*;
use pretty_assertions::assert_eq;

use grove_diagnostic::ErrorCode;
use grove_types::MemberRef;

use crate::test_helpers::{add_annotated_field, broken, entries, new_log, recorder, recorder_with, Fixture, Log};
use crate::{AnnotationCollector, PipelineConfig};

const PHASE: CompilePhase = CompilePhase::SemanticAnalysis;

fn collect_and_visit(registry: &TransformRegistry, fx: &mut Fixture) -> usize {
    let config = PipelineConfig::default();
    AnnotationCollector::new(registry, &config).collect(&fx.graph, &mut fx.unit);
    TransformVisitor::new(registry, PHASE).visit_unit(&mut fx.graph, &mut fx.unit)
}

fn single(name: &'static str, log: &Log) -> TransformRegistry {
    let mut registry = TransformRegistry::new();
    registry.register(name, PHASE, recorder(name, log)).unwrap();
    registry
}

#[test]
fn invokes_each_target_once() {
    let log = new_log();
    let registry = single("Gen", &log);
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Gen"]);
    let person = fx.class("Person");
    let age = fx.field(person, "age");
    let on_class = fx.annotate(MemberRef::Class(person), trigger);
    let on_field = fx.annotate(age, trigger);

    assert_eq!(collect_and_visit(&registry, &mut fx), 2);
    assert_eq!(
        entries(&log),
        vec![
            format!("Gen:Person@{}", on_class.raw()),
            format!("Gen:age@{}", on_field.raw()),
        ]
    );
}

#[test]
fn annotations_added_while_applying_are_not_triggered() {
    let log = new_log();
    let mut registry = TransformRegistry::new();
    registry
        .register("Gen", PHASE, recorder_with("Gen", &log, Some(add_annotated_field)))
        .unwrap();
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Gen"]);
    let person = fx.class("Person");
    let id = fx.annotate(MemberRef::Class(person), trigger);

    assert_eq!(collect_and_visit(&registry, &mut fx), 1);
    assert_eq!(entries(&log), vec![format!("Gen:Person@{}", id.raw())]);

    // The transform did add an annotated field.
    let generated = fx.graph.declared_field(person, fx.graph.intern("generated")).unwrap();
    assert_eq!(fx.graph.annotations(MemberRef::Field(generated)).len(), 1);
    // It is only known to the index once a later collection pass sees it.
    assert_eq!(fx.unit.triggers_for(PHASE, "Gen"), vec![id]);
}

#[test]
fn instantiation_failure_is_reported_once_per_class() {
    let log = new_log();
    let mut registry = single("Gen", &log);
    registry.register("Broken", PHASE, broken("Broken")).unwrap();
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Broken", "Gen"]);
    let person = fx.class("Person");
    let a = fx.field(person, "a");
    let b = fx.field(person, "b");
    let on_a = fx.annotate(a, trigger);
    let on_b = fx.annotate(b, trigger);

    assert_eq!(collect_and_visit(&registry, &mut fx), 2);
    assert_eq!(
        entries(&log),
        vec![format!("Gen:a@{}", on_a.raw()), format!("Gen:b@{}", on_b.raw())]
    );
    let codes: Vec<_> = fx.unit.diagnostics.peek().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0101]);
    let diag = fx.unit.diagnostics.peek().next().unwrap();
    assert_eq!(
        diag.message,
        "could not instantiate transform `Broken`: constructor panicked"
    );
}

#[test]
fn other_phases_run_nothing() {
    let log = new_log();
    let registry = single("Gen", &log);
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Gen"]);
    let person = fx.class("Person");
    fx.annotate(MemberRef::Class(person), trigger);

    let config = PipelineConfig::default();
    AnnotationCollector::new(&registry, &config).collect(&fx.graph, &mut fx.unit);
    let later = TransformVisitor::new(&registry, CompilePhase::ClassGeneration);
    assert_eq!(later.visit_unit(&mut fx.graph, &mut fx.unit), 0);
    assert!(entries(&log).is_empty());
}

#[test]
fn classes_are_visited_in_unit_order() {
    let log = new_log();
    let registry = single("Gen", &log);
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Gen"]);
    let second = fx.class("Second");
    let first = fx.class("First");
    let on_second = fx.annotate(MemberRef::Class(second), trigger);
    let on_first = fx.annotate(MemberRef::Class(first), trigger);

    assert_eq!(collect_and_visit(&registry, &mut fx), 2);
    assert_eq!(
        entries(&log),
        vec![
            format!("Gen:Second@{}", on_second.raw()),
            format!("Gen:First@{}", on_first.raw()),
        ]
    );
}
