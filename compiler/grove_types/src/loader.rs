//! Reflection-loader seam.
//!
//! Classes that come from compiled libraries are registered with their header
//! (super class, interfaces, type parameters) up front. Their members are
//! produced by a [`MemberLoader`] the first time anything asks for them, so
//! the thousands of library classes a compilation touches only pay for the
//! members that are actually inspected.

use crate::{ClassGraph, ClassId, ClassMembers};

/// Supplies the members of reflected classes on demand.
///
/// `load` runs at most once per class, under that class's initialization
/// cell. It may query other classes in `graph` but must not ask for the
/// members of `class` itself, which would wait on its own initialization.
pub trait MemberLoader: Send + Sync {
    fn load(&self, graph: &ClassGraph, class: ClassId) -> ClassMembers;
}

impl<F> MemberLoader for F
where
    F: Fn(&ClassGraph, ClassId) -> ClassMembers + Send + Sync,
{
    fn load(&self, graph: &ClassGraph, class: ClassId) -> ClassMembers {
        self(graph, class)
    }
}
