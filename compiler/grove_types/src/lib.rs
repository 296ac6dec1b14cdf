//! Class model and type lattice for Grove.
//!
//! - [`ClassGraph`]: arena of class records addressed by [`ClassId`], with
//!   redirect chains for stubs, placeholders and use-site parameterizations.
//!   Members of reflected classes are populated lazily through a
//!   [`MemberLoader`].
//! - [`GenericsType`]: one type-argument slot, with the compatibility
//!   predicate and the substitution algebra over the hierarchy.
//! - [`widening`]: numeric widening categories and the lowest upper bound
//!   of two types, which may synthesize a virtual common type.
//!
//! Type equality is by name: two references are the same type iff their
//! redirect chains end at records with the same qualified name.

mod class_id;
mod flags;
mod generics;
mod graph;
mod loader;
mod members;
pub mod stack;
mod well_known;
pub mod widening;

pub use class_id::ClassId;
pub use flags::Modifiers;
pub use generics::{GenericsKind, GenericsSpec, GenericsType, PlaceholderMap};
pub use graph::{ClassBuilder, ClassGraph, ClassKind, Origin, SuperChain, VirtualType};
pub use loader::MemberLoader;
pub use members::{
    AnnotationId, AnnotationNode, AnnotationValue, ClassMembers, ConstructorNode, ConstructorRef,
    FieldNode, FieldRef, MemberRef, MethodNode, MethodRef, Parameter, PropertyNode, PropertyRef,
};
pub use widening::NumericCategory;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ClassId, GenericsType};
    const _: () = assert!(std::mem::size_of::<ClassId>() == 4);
    const _: () = assert!(std::mem::size_of::<GenericsType>() <= 48);
}
