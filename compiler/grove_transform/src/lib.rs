//! AST transform pipeline for Grove.
//!
//! Transforms are tree rewrites run at a fixed [`CompilePhase`]:
//!
//! - **Local** transforms are triggered by annotations. The
//!   [`AnnotationCollector`] finds annotation occurrences whose definition
//!   carries the [`TRANSFORM_MARKER`] and records them per phase; the
//!   [`TransformVisitor`] then runs them class by class in two passes.
//! - **Global** transforms are listed in service listings
//!   ([`GlobalTransforms`]) and run once per source unit.
//!
//! [`TransformPipeline`] ties the two together. Problems in user source are
//! recoverable diagnostics; a broken transform never stops a compilation.

mod collector;
mod config;
mod error;
mod global;
mod phase;
mod pipeline;
mod registry;
mod source;
mod transform;
mod visitor;

pub use collector::{AnnotationCollector, TRANSFORM_MARKER};
pub use config::PipelineConfig;
pub use error::TransformError;
pub use global::{parse_listing, DiscoveryStage, GlobalTransforms};
pub use phase::CompilePhase;
pub use pipeline::TransformPipeline;
pub use registry::{TransformEntry, TransformFactory, TransformRegistry};
pub use source::SourceUnit;
pub use transform::{AstTransformation, TransformContext, TransformTarget};
pub use visitor::TransformVisitor;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=grove_transform=debug`
/// or `RUST_LOG=grove_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod test_helpers;
