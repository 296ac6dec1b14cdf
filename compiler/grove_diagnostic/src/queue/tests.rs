use super::*;
use pretty_assertions::assert_eq;

fn error_at(start: u32, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0102)
        .with_message(message)
        .with_label(Span::new(start, start + 4), "here")
}

#[test]
fn flush_sorts_by_position() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(error_at(40, "third"));
    queue.add(error_at(0, "first"));
    queue.add(error_at(12, "second"));

    let messages: Vec<String> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert!(queue.is_empty());
    assert!(!queue.has_errors());
}

#[test]
fn identical_diagnostics_are_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error_at(3, "phase too early")));
    assert!(!queue.add(error_at(3, "phase too early")));
    assert!(queue.add(error_at(9, "phase too early")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn unlimited_config_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    assert!(queue.add(error_at(3, "dup")));
    assert!(queue.add(error_at(3, "dup")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn error_limit_drops_excess_and_reports_once() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: true,
    });
    assert!(queue.add(error_at(0, "a")));
    assert!(queue.add(error_at(5, "b")));
    assert!(queue.limit_reached());
    assert!(!queue.add(error_at(10, "c")));
    assert!(!queue.add(error_at(15, "d")));

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 3);
    assert_eq!(flushed[2].code, ErrorCode::E0901);
    assert!(!flushed[2].is_error());
}

#[test]
fn warnings_do_not_count_toward_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 1,
        deduplicate: false,
    });
    assert!(queue.add(Diagnostic::warning(ErrorCode::E0104).with_message("w1")));
    assert!(queue.add(Diagnostic::warning(ErrorCode::E0104).with_message("w2")));
    assert!(queue.add(error_at(0, "e")));
    assert_eq!(queue.error_count(), 1);
    assert!(queue.add(Diagnostic::warning(ErrorCode::E0104).with_message("w3")));
}

#[test]
fn peek_does_not_clear() {
    let mut queue = DiagnosticQueue::new();
    queue.add(error_at(1, "x"));
    assert_eq!(queue.peek().count(), 1);
    assert_eq!(queue.len(), 1);
}
