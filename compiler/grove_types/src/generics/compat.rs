//! Generics compatibility: does a candidate type satisfy a type-parameter
//! binding, including the placeholder bindings carried by the bound itself?

use smallvec::SmallVec;

use super::GenericsType;
use crate::stack::ensure_sufficient_stack;
use crate::{ClassGraph, ClassId};

impl GenericsType {
    /// Can `candidate` be used where this descriptor is expected?
    ///
    /// - An empty argument list (`<>`) always matches.
    /// - A placeholder candidate matches by name.
    /// - A wildcard or placeholder descriptor checks its bounds, then the
    ///   type arguments of the candidate against those bounds.
    /// - A concrete descriptor needs the same class with compatible
    ///   type arguments.
    pub fn is_compatible_with(&self, graph: &mut ClassGraph, candidate: ClassId) -> bool {
        ensure_sufficient_stack(|| {
            let generics = graph.generics(candidate).map(<[GenericsType]>::to_vec);
            if generics.as_ref().is_some_and(Vec::is_empty) {
                return true;
            }

            if graph.is_generics_placeholder(candidate) {
                let Some(name) = generics.and_then(|g| g.first().map(|gt| gt.name)) else {
                    return true;
                };
                if self.wildcard {
                    if let Some(lower) = self.lower_bound {
                        return name == graph.unresolved_name(lower);
                    }
                    if let Some(upper) = &self.upper_bounds {
                        return upper.iter().any(|&u| name == graph.unresolved_name(u));
                    }
                }
                return name == self.name;
            }

            if self.wildcard || self.placeholder {
                if let Some(upper) = &self.upper_bounds {
                    let within = upper
                        .iter()
                        .all(|&bound| graph.implements_interface_or_is_subclass_of(candidate, bound));
                    return within && self.check_generics(graph, candidate);
                }
                if let Some(lower) = self.lower_bound {
                    return graph.implements_interface_or_is_subclass_of(lower, candidate)
                        && self.check_generics(graph, candidate);
                }
                return true;
            }

            graph.same_class(candidate, self.ty) && graph.compare_generics_with_bound(candidate, self.ty)
        })
    }

    fn check_generics(&self, graph: &mut ClassGraph, candidate: ClassId) -> bool {
        if let Some(lower) = self.lower_bound {
            return graph.compare_generics_with_bound(candidate, lower);
        }
        self.upper_bounds
            .iter()
            .flatten()
            .all(|&bound| graph.compare_generics_with_bound(candidate, bound))
    }
}

impl ClassGraph {
    /// `ty` is `target`, extends it, or implements it. A virtual target
    /// requires its upper bound and every one of its interfaces. Arrays
    /// compare their components.
    pub fn implements_interface_or_is_subclass_of(&self, ty: ClassId, target: ClassId) -> bool {
        if self.same_class(ty, target) || self.is_derived_from(ty, target) || self.implements_interface(ty, target)
        {
            return true;
        }
        if self.is_virtual(target) {
            let upper = self.super_class(target).unwrap_or(ClassId::OBJECT);
            if self.implements_interface_or_is_subclass_of(ty, upper)
                && self
                    .interfaces(target)
                    .iter()
                    .all(|&iface| self.implements_interface(ty, iface))
            {
                return true;
            }
        }
        match (self.component(ty), self.component(target)) {
            (Some(a), Some(b)) => self.implements_interface_or_is_subclass_of(a, b),
            _ => false,
        }
    }

    /// Do the type arguments of `node` satisfy those of `bound`?
    ///
    /// When `node` is not `bound`'s class, it is first re-parameterized as
    /// the matching interface or super class.
    pub(crate) fn compare_generics_with_bound(&mut self, node: ClassId, bound: ClassId) -> bool {
        ensure_sufficient_stack(|| {
            if self.generics(bound).is_none() || self.is_generics_placeholder(node) {
                return true;
            }

            if !self.same_class(node, bound) {
                return self.compare_through_hierarchy(node, bound);
            }

            let Some(node_types) = self
                .generics_vec(node)
                .or_else(|| self.generics_vec(self.terminal(node)))
            else {
                return true;
            };
            let Some(redirect_bound) = self.generics_vec(self.terminal(bound)) else {
                return true;
            };
            let bound_placeholders = self.extract_placeholders(bound);
            let node_placeholders = self.extract_placeholders(node);

            let mut matched = true;
            for (node_type, redirect_slot) in node_types.iter().zip(&redirect_bound) {
                if !matched {
                    break;
                }
                if node_type.placeholder {
                    if redirect_slot.placeholder {
                        matched = node_type.name == redirect_slot.name;
                        if !matched {
                            if let Some(gt) = bound_placeholders.get(&redirect_slot.name) {
                                if gt.placeholder {
                                    matched = true;
                                } else if gt.wildcard {
                                    if let Some(upper) = &gt.upper_bounds {
                                        for &u in upper {
                                            matched |= redirect_slot.is_compatible_with(self, u);
                                        }
                                    } else if let Some(lower) = gt.lower_bound {
                                        matched = redirect_slot.is_compatible_with(self, lower);
                                    }
                                }
                            }
                        }
                    } else {
                        let effective = node_placeholders.get(&node_type.name).unwrap_or(node_type);
                        matched = effective.is_compatible_with(self, redirect_slot.ty);
                    }
                } else if redirect_slot.placeholder {
                    let mut slot = redirect_slot;
                    if let Some(bound_slot) = bound_placeholders.get(&redirect_slot.name) {
                        slot = bound_slot;
                        if slot.wildcard {
                            return self.wildcard_slot_matches(slot, node_type, &node_placeholders);
                        }
                        if slot.placeholder {
                            if let Some(bound_on_node) = node_placeholders.get(&slot.name) {
                                slot = bound_on_node;
                            }
                        }
                    }
                    matched = slot.is_compatible_with(self, node_type.ty);
                } else {
                    matched = redirect_slot.wildcard || node_type.is_compatible_with(self, redirect_slot.ty);
                }
            }
            matched
        })
    }

    fn compare_through_hierarchy(&mut self, node: ClassId, bound: ClassId) -> bool {
        if self.is_interface(bound) {
            let face = self
                .all_interfaces(node)
                .into_iter()
                .find(|&face| self.same_class(face, bound));
            if let Some(face) = face {
                let face = if self.generics(face).is_some() {
                    self.parameterize_type(node, face)
                } else {
                    face
                };
                return self.compare_generics_with_bound(face, bound);
            }
        }

        if self.is_virtual(bound) {
            let upper = self.unresolved_super_class(bound).unwrap_or(ClassId::OBJECT);
            let interfaces: SmallVec<[ClassId; 4]> = self.interfaces(bound).iter().copied().collect();
            if self.compare_generics_with_bound(node, upper)
                && interfaces
                    .into_iter()
                    .all(|face| self.compare_generics_with_bound(node, face))
            {
                return true;
            }
        }

        if self.same_class(node, ClassId::OBJECT) {
            return false;
        }
        let next = match self.unresolved_super_class(node) {
            None => ClassId::OBJECT,
            Some(super_class) if self.generics(super_class).is_some() => self.parameterize_type(node, super_class),
            Some(super_class) => super_class,
        };
        self.compare_generics_with_bound(next, bound)
    }

    /// A concrete argument against a bound slot that is itself a wildcard
    /// (`? super T` in `Comparable<? super T>`): the argument must lie
    /// between the wildcard's bounds, with placeholders read through the
    /// argument's own bindings.
    fn wildcard_slot_matches(
        &mut self,
        slot: &GenericsType,
        node_type: &GenericsType,
        node_placeholders: &super::PlaceholderMap,
    ) -> bool {
        let mut matched = true;
        if let Some(lower) = slot.lower_bound {
            let bound = self.through_placeholders(lower, node_placeholders);
            matched = self.implements_interface_or_is_subclass_of(bound, node_type.ty);
        }
        if matched {
            for &upper in slot.upper_bounds.iter().flatten() {
                let bound = self.through_placeholders(upper, node_placeholders);
                matched = self.implements_interface_or_is_subclass_of(node_type.ty, bound)
                    || node_type.is_compatible_with(self, bound);
                if !matched {
                    break;
                }
            }
        }
        matched
    }

    fn through_placeholders(&self, ty: ClassId, bindings: &super::PlaceholderMap) -> ClassId {
        if !self.is_generics_placeholder(ty) {
            return ty;
        }
        bindings
            .get(&self.placeholder_name(ty))
            .map_or(ty, |gt| gt.ty)
    }
}
