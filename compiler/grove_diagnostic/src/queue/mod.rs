//! Per-source-unit diagnostic collection.
//!
//! Transforms and the collector report into a queue owned by the source unit
//! they are processing. The queue enforces an error limit, drops exact
//! duplicates (the same annotation reported twice by overlapping schedules)
//! and hands diagnostics back ordered by source position.

use rustc_hash::FxHashSet;

use grove_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical in code, position and message to one
    /// already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limit and no deduplication (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Identity of a queued diagnostic for deduplication.
type DedupKey = (ErrorCode, Span, String);

/// Queue for collecting, deduplicating and sorting diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<DedupKey>,
    error_count: usize,
    /// Set once an error was refused because of the limit.
    overflowed: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            error_count: 0,
            overflowed: false,
            config,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was queued, `false` if it was filtered out by the
    /// error limit or as a duplicate.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.overflowed = true;
            tracing::debug!(code = %diag.code, "diagnostic dropped: error limit reached");
            return false;
        }

        if self.config.deduplicate {
            let key = (
                diag.code,
                diag.primary_span().unwrap_or(Span::DUMMY),
                diag.message.clone(),
            );
            if !self.seen.insert(key) {
                return false;
            }
        }

        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort diagnostics by position and return them, clearing the queue.
    ///
    /// Diagnostics without a span sort first. The sort is stable, so
    /// diagnostics at the same position keep report order. If errors were
    /// dropped because of the limit, a trailing E0901 note is appended.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.primary_span().unwrap_or(Span::DUMMY).start);

        if self.overflowed {
            result.push(too_many_errors(self.config.error_limit));
        }

        self.seen.clear();
        self.error_count = 0;
        self.overflowed = false;
        result
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize) -> Diagnostic {
    Diagnostic::warning(ErrorCode::E0901)
        .with_message(format!("further errors suppressed after {limit} errors"))
        .with_note("raise the error limit in the compiler configuration to see more")
}

#[cfg(test)]
mod tests;
