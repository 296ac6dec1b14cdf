//! Global transforms: discovered from service listings, run once per unit.
//!
//! A service listing names one transform per line. `#` starts a comment;
//! blank lines are ignored:
//!
//! ```text
//! # transforms shipped with the standard library
//! grove.transform.AstBuilderTransform
//! grove.transform.LoggingTransform   # adds a `log` field
//! ```
//!
//! Listings are scanned in two stages, before and after dependency
//! resolution. A name is only ever scheduled once, whichever scan sees it
//! first.

use rustc_hash::FxHashSet;

use grove_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use grove_ir::Span;
use grove_types::ClassGraph;

use crate::{
    AstTransformation, CompilePhase, PipelineConfig, SourceUnit, TransformContext, TransformError,
    TransformRegistry, TransformTarget,
};

/// When a listing was scanned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiscoveryStage {
    BeforeResolution,
    AfterResolution,
}

/// Names in a service listing with their byte spans.
pub fn parse_listing(listing: &str) -> Vec<(Span, &str)> {
    let mut entries = Vec::new();
    let mut offset = 0usize;
    for line in listing.split_inclusive('\n') {
        let content = line.split('#').next().unwrap_or_default();
        let name = content.trim();
        if !name.is_empty() {
            let start = offset + (content.len() - content.trim_start().len());
            let end = start + name.len();
            entries.push((span_of(start, end), name));
        }
        offset += line.len();
    }
    entries
}

fn span_of(start: usize, end: usize) -> Span {
    let clamp = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    Span::new(clamp(start), clamp(end))
}

struct GlobalTransform {
    name: String,
    phase: CompilePhase,
    stage: DiscoveryStage,
    instance: Box<dyn AstTransformation>,
}

/// The global transforms discovered so far, in discovery order.
#[derive(Default)]
pub struct GlobalTransforms {
    /// Every name a scan has seen, scheduled or not.
    seen: FxHashSet<String>,
    scheduled: Vec<GlobalTransform>,
}

impl GlobalTransforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `listing`, scheduling every transform not seen by an earlier
    /// scan. Problems are reported to `diagnostics` with spans into the
    /// listing. Returns the number of transforms scheduled.
    #[tracing::instrument(level = "debug", skip(self, listing, registry, config, diagnostics))]
    pub fn discover(
        &mut self,
        listing: &str,
        stage: DiscoveryStage,
        registry: &TransformRegistry,
        config: &PipelineConfig,
        diagnostics: &mut DiagnosticQueue,
    ) -> usize {
        let mut scheduled = 0;
        for (span, name) in parse_listing(listing) {
            if !self.seen.insert(name.to_owned()) {
                tracing::trace!(transform = name, "already discovered");
                continue;
            }
            if config.is_global_disabled(name) {
                tracing::debug!(transform = name, "global transform disabled");
                continue;
            }
            let Some(entry) = registry.get(name) else {
                diagnostics.add(TransformError::Unknown { name: name.to_owned() }.to_diagnostic(span));
                continue;
            };
            let min = config.min_global_phase;
            if entry.phase() < min {
                diagnostics.add(
                    Diagnostic::error(ErrorCode::E0102)
                        .with_message(format!(
                            "global transform `{name}` is declared for {}, which is earlier than {min}",
                            entry.phase()
                        ))
                        .with_label(span, "listed here"),
                );
                continue;
            }
            match entry.instantiate() {
                Ok(instance) => {
                    tracing::debug!(transform = name, phase = %entry.phase(), "global transform scheduled");
                    self.scheduled.push(GlobalTransform {
                        name: name.to_owned(),
                        phase: entry.phase(),
                        stage,
                        instance,
                    });
                    scheduled += 1;
                }
                Err(error) => {
                    diagnostics.add(error.to_diagnostic(span));
                }
            }
        }
        scheduled
    }

    /// Scheduled transform names, in discovery order.
    pub fn names(&self) -> Vec<&str> {
        self.scheduled.iter().map(|g| g.name.as_str()).collect()
    }

    /// Names scheduled for `phase`.
    pub fn scheduled_for(&self, phase: CompilePhase) -> Vec<&str> {
        self.scheduled
            .iter()
            .filter(|g| g.phase == phase)
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Names discovered in `stage`.
    pub fn discovered_in(&self, stage: DiscoveryStage) -> Vec<&str> {
        self.scheduled
            .iter()
            .filter(|g| g.stage == stage)
            .map(|g| g.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Run the transforms scheduled for `phase` over `unit`.
    pub(crate) fn run(&mut self, phase: CompilePhase, graph: &mut ClassGraph, unit: &mut SourceUnit) -> usize {
        let mut invoked = 0;
        for global in self.scheduled.iter_mut().filter(|g| g.phase == phase) {
            tracing::trace!(transform = %global.name, unit = unit.name(), "global transform");
            let mut ctx = TransformContext {
                graph: &mut *graph,
                unit: &mut *unit,
                phase,
            };
            global.instance.visit(&TransformTarget::Unit, &mut ctx);
            invoked += 1;
        }
        invoked
    }
}

#[cfg(test)]
mod tests;
