//! Generics descriptors and the algorithms over them.
//!
//! A [`GenericsType`] is one slot of a type-argument or type-parameter list:
//! `String` in `List<String>`, `? extends Number`, or `T extends Comparable<T>`.
//! The matching predicate lives in [`compat`]; substitution and hierarchy
//! walking live in [`algebra`].

mod algebra;
mod compat;

pub use algebra::{GenericsSpec, PlaceholderMap};

use grove_ir::Name;

use crate::{ClassGraph, ClassId};

/// Semantic kind of a descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GenericsKind {
    /// Names an unbound type variable (`T`).
    Placeholder,
    /// `?`, `? extends X` or `? super X`.
    Wildcard,
    /// A concrete argument (`String`, `List<T>`).
    Concrete,
}

/// One type-parameter binding or type argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericsType {
    /// The bound or concrete type. For placeholders this is the placeholder
    /// node itself; for wildcards the `?` node.
    pub ty: ClassId,
    pub upper_bounds: Option<Vec<ClassId>>,
    pub lower_bound: Option<ClassId>,
    pub name: Name,
    pub placeholder: bool,
    pub wildcard: bool,
    pub resolved: bool,
}

impl GenericsType {
    /// Descriptor for `ty` used as a type argument.
    ///
    /// Placeholder-ness and the display name are taken from `ty`.
    pub fn of(graph: &ClassGraph, ty: ClassId) -> Self {
        Self::bounded(graph, ty, None, None)
    }

    /// Descriptor for `ty` with explicit bounds.
    pub fn bounded(
        graph: &ClassGraph,
        ty: ClassId,
        upper_bounds: Option<Vec<ClassId>>,
        lower_bound: Option<ClassId>,
    ) -> Self {
        let placeholder = graph.is_generics_placeholder(ty);
        let name = if placeholder {
            graph.unresolved_name(ty)
        } else {
            graph.name(ty)
        };
        GenericsType {
            ty,
            upper_bounds,
            lower_bound,
            name,
            placeholder,
            wildcard: false,
            resolved: !placeholder && graph.is_resolved(ty),
        }
    }

    /// Build a wildcard descriptor `? extends bounds` (or plain `?` when
    /// `bounds` is empty).
    pub fn wildcard(graph: &ClassGraph, upper_bounds: Vec<ClassId>) -> Self {
        let upper = if upper_bounds.is_empty() {
            None
        } else {
            Some(upper_bounds)
        };
        Self::wildcard_node(graph, upper, None)
    }

    /// Build `? super lower`.
    pub fn wildcard_super(graph: &ClassGraph, lower: ClassId) -> Self {
        Self::wildcard_node(graph, None, Some(lower))
    }

    fn wildcard_node(
        graph: &ClassGraph,
        upper_bounds: Option<Vec<ClassId>>,
        lower_bound: Option<ClassId>,
    ) -> Self {
        GenericsType {
            ty: ClassId::WILDCARD,
            upper_bounds,
            lower_bound,
            name: graph.unresolved_name(ClassId::WILDCARD),
            placeholder: false,
            wildcard: true,
            resolved: true,
        }
    }

    /// Placeholders count as resolved: they are symbols, not references.
    pub fn is_resolved(&self) -> bool {
        self.resolved || self.placeholder
    }

    pub fn kind(&self) -> GenericsKind {
        if self.placeholder {
            GenericsKind::Placeholder
        } else if self.wildcard {
            GenericsKind::Wildcard
        } else {
            GenericsKind::Concrete
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}
