//! Registry of known transforms, keyed by name.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{AstTransformation, CompilePhase, TransformError};

/// Builds a fresh transform instance.
pub type TransformFactory =
    Arc<dyn Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync>;

/// A registered transform: its declared phase and how to build it.
#[derive(Clone)]
pub struct TransformEntry {
    name: String,
    phase: CompilePhase,
    factory: TransformFactory,
}

impl TransformEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> CompilePhase {
        self.phase
    }

    pub fn instantiate(&self) -> Result<Box<dyn AstTransformation>, TransformError> {
        (self.factory)()
    }
}

impl fmt::Debug for TransformEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformEntry")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Every transform the compiler can instantiate.
///
/// Annotation markers and service listings refer to transforms by the name
/// they were registered under.
#[derive(Clone, Debug, Default)]
pub struct TransformRegistry {
    entries: FxHashMap<String, TransformEntry>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` as `name`, running in `phase`.
    ///
    /// A second registration of the same name is refused and the first one
    /// kept.
    pub fn register<F>(&mut self, name: &str, phase: CompilePhase, factory: F) -> Result<(), TransformError>
    where
        F: Fn() -> Result<Box<dyn AstTransformation>, TransformError> + Send + Sync + 'static,
    {
        if self.entries.contains_key(name) {
            return Err(TransformError::Duplicate { name: name.to_owned() });
        }
        tracing::trace!(transform = name, %phase, "transform registered");
        self.entries.insert(
            name.to_owned(),
            TransformEntry {
                name: name.to_owned(),
                phase,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TransformEntry> {
        self.entries.get(name)
    }

    /// Instantiate `name`, failing with [`TransformError::Unknown`] if it is
    /// not registered.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn AstTransformation>, TransformError> {
        match self.get(name) {
            Some(entry) => entry.instantiate(),
            None => Err(TransformError::Unknown { name: name.to_owned() }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
