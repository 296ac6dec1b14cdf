use super::*;
use pretty_assertions::assert_eq;

use crate::test_helpers::{broken, entries, new_log, recorder, Log};

fn registry(log: &Log) -> TransformRegistry {
    let mut registry = TransformRegistry::new();
    registry
        .register("grove.Logging", CompilePhase::Conversion, recorder("Logging", log))
        .unwrap();
    registry
        .register("grove.Builder", CompilePhase::Canonicalization, recorder("Builder", log))
        .unwrap();
    registry
        .register("grove.Early", CompilePhase::Parsing, recorder("Early", log))
        .unwrap();
    registry
        .register("grove.Broken", CompilePhase::Conversion, broken("grove.Broken"))
        .unwrap();
    registry
}

fn codes(queue: &DiagnosticQueue) -> Vec<ErrorCode> {
    queue.peek().map(|d| d.code).collect()
}

#[test]
fn listing_skips_comments_and_blank_lines() {
    let listing = "# shipped transforms\n\n  grove.Logging  # adds a log field\ngrove.Builder\n#grove.Disabled\n";
    let entries = parse_listing(listing);
    let names: Vec<&str> = entries.iter().map(|&(_, name)| name).collect();
    assert_eq!(names, vec!["grove.Logging", "grove.Builder"]);

    let (span, name) = entries[0];
    assert_eq!(&listing[span.start as usize..span.end as usize], name);
    let (span, name) = entries[1];
    assert_eq!(&listing[span.start as usize..span.end as usize], name);
}

#[test]
fn listing_without_trailing_newline() {
    let names: Vec<&str> = parse_listing("a\r\nb").into_iter().map(|(_, n)| n).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn names_are_deduplicated_across_scans() {
    let log = new_log();
    let registry = registry(&log);
    let config = PipelineConfig::default();
    let mut queue = DiagnosticQueue::new();
    let mut globals = GlobalTransforms::new();

    let first = globals.discover(
        "grove.Logging\ngrove.Logging\n",
        DiscoveryStage::BeforeResolution,
        &registry,
        &config,
        &mut queue,
    );
    let second = globals.discover(
        "grove.Builder\ngrove.Logging\n",
        DiscoveryStage::AfterResolution,
        &registry,
        &config,
        &mut queue,
    );

    assert_eq!((first, second), (1, 1));
    assert_eq!(globals.names(), vec!["grove.Logging", "grove.Builder"]);
    assert_eq!(globals.discovered_in(DiscoveryStage::BeforeResolution), vec!["grove.Logging"]);
    assert_eq!(globals.discovered_in(DiscoveryStage::AfterResolution), vec!["grove.Builder"]);
    assert_eq!(globals.scheduled_for(CompilePhase::Canonicalization), vec!["grove.Builder"]);
    assert!(queue.is_empty());
}

#[test]
fn problems_are_reported_once_with_listing_spans() {
    let log = new_log();
    let registry = registry(&log);
    let config = PipelineConfig::default();
    let mut queue = DiagnosticQueue::new();
    let mut globals = GlobalTransforms::new();

    let listing = "grove.Missing\ngrove.Early\ngrove.Broken\n";
    for stage in [DiscoveryStage::BeforeResolution, DiscoveryStage::AfterResolution] {
        assert_eq!(globals.discover(listing, stage, &registry, &config, &mut queue), 0);
    }

    assert!(globals.is_empty());
    assert_eq!(codes(&queue), vec![ErrorCode::E0105, ErrorCode::E0102, ErrorCode::E0101]);
    let spans: Vec<_> = queue.peek().filter_map(Diagnostic::primary_span).collect();
    assert_eq!(spans, vec![Span::new(0, 13), Span::new(14, 25), Span::new(26, 38)]);
}

#[test]
fn disabled_transforms_are_skipped_silently() {
    let log = new_log();
    let registry = registry(&log);
    let config = PipelineConfig::default().disable_global("grove.Logging");
    let mut queue = DiagnosticQueue::new();
    let mut globals = GlobalTransforms::new();

    let scheduled = globals.discover(
        "grove.Logging\ngrove.Builder\n",
        DiscoveryStage::BeforeResolution,
        &registry,
        &config,
        &mut queue,
    );
    assert_eq!(scheduled, 1);
    assert_eq!(globals.names(), vec!["grove.Builder"]);
    assert!(queue.is_empty());
}

#[test]
fn run_invokes_the_phase_transforms_on_the_unit() {
    let log = new_log();
    let registry = registry(&log);
    let config = PipelineConfig::default();
    let mut queue = DiagnosticQueue::new();
    let mut globals = GlobalTransforms::new();
    globals.discover(
        "grove.Logging\ngrove.Builder\n",
        DiscoveryStage::BeforeResolution,
        &registry,
        &config,
        &mut queue,
    );

    let mut graph = ClassGraph::new();
    let mut unit = SourceUnit::new("Main.grove");
    assert_eq!(globals.run(CompilePhase::Conversion, &mut graph, &mut unit), 1);
    assert_eq!(globals.run(CompilePhase::SemanticAnalysis, &mut graph, &mut unit), 0);
    assert_eq!(globals.run(CompilePhase::Canonicalization, &mut graph, &mut unit), 1);
    assert_eq!(entries(&log), vec!["Logging:Main.grove", "Builder:Main.grove"]);
}
