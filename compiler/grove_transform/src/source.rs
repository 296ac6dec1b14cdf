//! One compilation unit: its classes, its diagnostics and the transform
//! triggers found in it.

use rustc_hash::{FxHashMap, FxHashSet};

use grove_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use grove_types::{AnnotationId, ClassId};

use crate::CompilePhase;

/// A source file being compiled.
///
/// Holds the primary classes declared in the file and the diagnostics
/// reported against it. The class records themselves live in the shared
/// [`ClassGraph`](grove_types::ClassGraph).
#[derive(Debug)]
pub struct SourceUnit {
    name: String,
    classes: Vec<ClassId>,
    pub diagnostics: DiagnosticQueue,
    pub(crate) triggers: TriggerIndex,
    /// Last phase run over this unit by a pipeline.
    pub(crate) last_phase: Option<CompilePhase>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, DiagnosticConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: DiagnosticConfig) -> Self {
        SourceUnit {
            name: name.into(),
            classes: Vec::new(),
            diagnostics: DiagnosticQueue::with_config(config),
            triggers: TriggerIndex::default(),
            last_phase: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[ClassId] {
        &self.classes
    }

    /// Add a class declared in this unit. Transforms may call this to add
    /// generated classes; they are visited from the next phase on.
    pub fn add_class(&mut self, class: ClassId) {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    /// Queue a diagnostic. Returns false if the error limit refused it.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        self.diagnostics.add(diagnostic)
    }

    pub fn last_phase(&self) -> Option<CompilePhase> {
        self.last_phase
    }

    /// Annotation occurrences that trigger `transform` in `phase`, in id
    /// order.
    pub fn triggers_for(&self, phase: CompilePhase, transform: &str) -> Vec<AnnotationId> {
        let mut ids: Vec<AnnotationId> = self
            .triggers
            .by_phase
            .get(&phase)
            .into_iter()
            .flatten()
            .filter(|(_, names)| names.iter().any(|n| n == transform))
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Per-phase map from annotation occurrence to the transforms it triggers.
///
/// Every occurrence is examined once; occurrences added later (by a
/// transform) are examined by the next collection pass.
#[derive(Debug, Default)]
pub(crate) struct TriggerIndex {
    examined: FxHashSet<AnnotationId>,
    by_phase: FxHashMap<CompilePhase, FxHashMap<AnnotationId, Vec<String>>>,
}

impl TriggerIndex {
    /// Mark `id` examined. False if it already was.
    pub(crate) fn examine(&mut self, id: AnnotationId) -> bool {
        self.examined.insert(id)
    }

    pub(crate) fn record(&mut self, phase: CompilePhase, id: AnnotationId, transform: &str) {
        let names = self.by_phase.entry(phase).or_default().entry(id).or_default();
        if !names.iter().any(|n| n == transform) {
            names.push(transform.to_owned());
        }
    }

    /// Transforms `id` triggers in `phase`.
    pub(crate) fn transforms(&self, phase: CompilePhase, id: AnnotationId) -> &[String] {
        self.by_phase
            .get(&phase)
            .and_then(|ids| ids.get(&id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn has_phase(&self, phase: CompilePhase) -> bool {
        self.by_phase.get(&phase).is_some_and(|ids| !ids.is_empty())
    }
}
