use super::*;
use pretty_assertions::assert_eq;

use grove_diagnostic::ErrorCode;
use grove_types::MemberRef;

use crate::test_helpers::{add_annotated_field, entries, new_log, recorder, recorder_with, Fixture};
use crate::TransformEntry;

#[test]
fn too_early_local_transform_is_reported_once_and_never_run() {
    let log = new_log();
    let mut pipeline = TransformPipeline::new(PipelineConfig::default());
    assert!(pipeline.register("Early", CompilePhase::Conversion, recorder("Early", &log)));
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Early"]);
    let person = fx.class("Person");
    fx.annotate(MemberRef::Class(person), trigger);

    pipeline.run_through(CompilePhase::Finalization, &mut fx.graph, &mut fx.unit);

    assert!(entries(&log).is_empty());
    let codes: Vec<_> = fx.unit.diagnostics.peek().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E0102]);
}

#[test]
fn globals_then_locals_in_phase_order() {
    let log = new_log();
    let mut pipeline = TransformPipeline::new(PipelineConfig::default());
    pipeline.register("grove.Logging", CompilePhase::Conversion, recorder("Logging", &log));
    pipeline.register("Gen", CompilePhase::SemanticAnalysis, recorder("Gen", &log));
    pipeline.register("Late", CompilePhase::ClassGeneration, recorder("Late", &log));
    assert_eq!(pipeline.discover_global("grove.Logging\n", DiscoveryStage::BeforeResolution), 1);

    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Late", "Gen"]);
    let person = fx.class("Person");
    let id = fx.annotate(MemberRef::Class(person), trigger);

    pipeline.run_through(CompilePhase::Output, &mut fx.graph, &mut fx.unit);
    assert_eq!(
        entries(&log),
        vec![
            "Logging:Test.grove".to_owned(),
            format!("Gen:Person@{}", id.raw()),
            format!("Late:Person@{}", id.raw()),
        ]
    );
    assert_eq!(fx.unit.last_phase(), Some(CompilePhase::Output));
    assert!(fx.unit.diagnostics.is_empty());
}

#[test]
fn a_phase_runs_once_per_unit() {
    let log = new_log();
    let mut pipeline = TransformPipeline::new(PipelineConfig::default());
    pipeline.register("grove.Logging", CompilePhase::SemanticAnalysis, recorder("Logging", &log));
    pipeline.discover_global("grove.Logging", DiscoveryStage::BeforeResolution);

    let mut graph = grove_types::ClassGraph::new();
    let mut first = SourceUnit::new("A.grove");
    let mut second = SourceUnit::new("B.grove");
    pipeline.run_phase(CompilePhase::SemanticAnalysis, &mut graph, &mut first);
    pipeline.run_phase(CompilePhase::SemanticAnalysis, &mut graph, &mut first);
    pipeline.run_phase(CompilePhase::Conversion, &mut graph, &mut first);
    pipeline.run_phase(CompilePhase::SemanticAnalysis, &mut graph, &mut second);

    assert_eq!(entries(&log), vec!["Logging:A.grove", "Logging:B.grove"]);
}

#[test]
fn added_annotations_are_not_triggered_in_the_same_phase() {
    let log = new_log();
    let mut pipeline = TransformPipeline::new(PipelineConfig::default());
    pipeline.register(
        "Gen",
        CompilePhase::SemanticAnalysis,
        recorder_with("Gen", &log, Some(add_annotated_field)),
    );
    let mut fx = Fixture::new();
    let trigger = fx.trigger("Trigger", &["Gen"]);
    let person = fx.class("Person");
    fx.annotate(MemberRef::Class(person), trigger);

    pipeline.run_through(CompilePhase::Finalization, &mut fx.graph, &mut fx.unit);

    assert_eq!(entries(&log).len(), 1);
    // The generated occurrence was collected later, for a phase already past.
    assert_eq!(fx.unit.triggers_for(CompilePhase::SemanticAnalysis, "Gen").len(), 2);
}

#[test]
fn duplicate_registration_is_reported() {
    let log = new_log();
    let mut pipeline = TransformPipeline::new(PipelineConfig::default());
    assert!(pipeline.register("Gen", CompilePhase::SemanticAnalysis, recorder("Gen", &log)));
    assert!(!pipeline.register("Gen", CompilePhase::Output, recorder("Other", &log)));

    assert_eq!(pipeline.registry().get("Gen").map(TransformEntry::phase), Some(CompilePhase::SemanticAnalysis));
    let diagnostics = pipeline.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E0104);
    assert_eq!(diagnostics[0].message, "transform `Gen` is already registered");
    assert!(pipeline.diagnostics().is_empty());
}

#[test]
fn phases_are_ordered() {
    assert!(CompilePhase::Conversion < CompilePhase::SemanticAnalysis);
    assert_eq!(CompilePhase::SemanticAnalysis.next(), Some(CompilePhase::Canonicalization));
    assert_eq!(CompilePhase::Finalization.next(), None);
    assert_eq!(
        CompilePhase::from_constant("SEMANTIC_ANALYSIS"),
        Some(CompilePhase::SemanticAnalysis)
    );
    assert_eq!(CompilePhase::from_constant("semantic_analysis"), None);
    assert_eq!(CompilePhase::InstructionSelection.to_string(), "instruction selection");
}
