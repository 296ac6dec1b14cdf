//! Lowest upper bound over the class and interface lattice.
//!
//! The computation runs in two passes. The structural pass finds the common
//! class, interface or synthesized virtual type while ignoring type
//! arguments. If the result uses generics, the second pass re-parameterizes
//! it from both operands: slots on which the operands agree keep the exact
//! argument, the others become `? extends LUB(argA, argB)`. The argument
//! LUBs recurse, and a pair of operands met again while its own arguments
//! are still being computed (`Integer implements Comparable<Integer>`, or
//! `Foo implements Comparable<Bar>` with `Bar implements Comparable<Foo>`)
//! takes its structural result instead.

use std::cmp::Ordering;

use smallvec::SmallVec;

use super::primitive_precedence;
use crate::stack::ensure_sufficient_stack;
use crate::{ClassGraph, ClassId, GenericsType};

impl ClassGraph {
    /// Most specific common supertype of `a` and `b`.
    ///
    /// ```text
    /// LUB(Integer, Double)           = Number (virtual, with Comparable<? extends ...>)
    /// LUB(int, long)                 = long
    /// LUB(A impl X,Y; B impl X,Y,Z)  = virtual Object with {X, Y}
    /// LUB(Object, anything)          = Object
    /// ```
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn lowest_upper_bound(&mut self, a: ClassId, b: ClassId) -> ClassId {
        self.guarded_lub(a, b, &mut Vec::new())
    }

    /// `in_progress` holds the unordered operand pairs whose type arguments
    /// are being computed further up the stack.
    fn guarded_lub(&mut self, a: ClassId, b: ClassId, in_progress: &mut Vec<(ClassId, ClassId)>) -> ClassId {
        let lub = self.structural_lub(a, b, None, None);
        if !self.is_using_generics(lub) {
            return lub;
        }
        let pair = self.operand_pair(a, b);
        if in_progress.contains(&pair) {
            tracing::trace!(a = self.name_str(a), b = self.name_str(b), "self-referential LUB");
            return lub;
        }

        in_progress.push(pair);
        let result = match self.lub_name(lub) {
            None => self.parameterize_lowest_upper_bound(lub, a, b, in_progress),
            Some(lub_name) => {
                let lub_name = self.lookup(lub_name);
                let upper = self.unresolved_super_class(lub).unwrap_or(ClassId::OBJECT);
                let upper = self.parameterize_lowest_upper_bound(upper, a, b, in_progress);
                let interfaces: SmallVec<[ClassId; 4]> = self.interfaces(lub).iter().copied().collect();
                let interfaces: SmallVec<[ClassId; 4]> = interfaces
                    .into_iter()
                    .map(|iface| self.parameterize_lowest_upper_bound(iface, a, b, in_progress))
                    .collect();
                self.alloc_virtual(lub_name, upper, &interfaces)
            }
        };
        in_progress.pop();
        result
    }

    fn operand_pair(&self, a: ClassId, b: ClassId) -> (ClassId, ClassId) {
        let (a, b) = (self.terminal(a), self.terminal(b));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// [`lowest_upper_bound`](Self::lowest_upper_bound) over possibly absent
    /// operands. A missing operand yields `None`.
    pub fn try_lowest_upper_bound(&mut self, a: Option<ClassId>, b: Option<ClassId>) -> Option<ClassId> {
        Some(self.lowest_upper_bound(a?, b?))
    }

    /// Lowest upper bound of a list, folded pairwise from the right.
    pub fn lowest_upper_bound_of(&mut self, types: &[ClassId]) -> Option<ClassId> {
        let (&last, rest) = types.split_last()?;
        Some(
            rest.iter()
                .rev()
                .fold(last, |acc, &ty| self.lowest_upper_bound(ty, acc)),
        )
    }

    fn structural_lub(
        &mut self,
        a: ClassId,
        b: ClassId,
        from_a: Option<Vec<ClassId>>,
        from_b: Option<Vec<ClassId>>,
    ) -> ClassId {
        ensure_sufficient_stack(|| {
            if let (Some(ac), Some(bc)) = (self.component(a), self.component(b)) {
                let component = self.structural_lub(ac, bc, from_a, from_b);
                return self.make_array(component);
            }

            if self.same_class(a, ClassId::OBJECT) || self.same_class(b, ClassId::OBJECT) {
                // `Object<T>` on both sides keeps the placeholder.
                if let (Some([x]), Some([y])) = (self.generics(a), self.generics(b)) {
                    if x.name == y.name {
                        return a;
                    }
                }
                return ClassId::OBJECT;
            }

            if self.same_class(a, ClassId::VOID) || self.same_class(b, ClassId::VOID) {
                return if self.same_class(a, b) {
                    ClassId::VOID
                } else {
                    ClassId::OBJECT
                };
            }

            match (self.is_primitive_type(a), self.is_primitive_type(b)) {
                (true, false) => {
                    let wrapped = self.wrapper(a);
                    return self.structural_lub(wrapped, b, None, None);
                }
                (false, true) => {
                    let wrapped = self.wrapper(b);
                    return self.structural_lub(a, wrapped, None, None);
                }
                (true, true) => {
                    let (ta, tb) = (self.terminal(a), self.terminal(b));
                    if let (Some(pa), Some(pb)) = (primitive_precedence(ta), primitive_precedence(tb)) {
                        return if pa <= pb { a } else { b };
                    }
                    if ta == tb {
                        return a;
                    }
                    let (wa, wb) = (self.wrapper(a), self.wrapper(b));
                    return self.structural_lub(wa, wb, None, None);
                }
                (false, false) => {}
            }

            match (self.is_interface(a), self.is_interface(b)) {
                (true, true) => self.interface_lub(a, b),
                (false, true) => self.structural_lub(b, a, None, None),
                (true, false) => {
                    let mut matching = Vec::new();
                    self.extract_most_specific_implemented_interfaces(b, a, &mut matching);
                    match matching.len() {
                        0 => ClassId::OBJECT,
                        1 => matching[0],
                        _ => self.build_type_with_interfaces(a, b, matching),
                    }
                }
                (false, false) => self.class_lub(a, b, from_a, from_b),
            }
        })
    }

    fn interface_lub(&mut self, a: ClassId, b: ClassId) -> ClassId {
        if self.same_class(a, b) || self.implements_interface(b, a) {
            return a;
        }
        if self.implements_interface(a, b) {
            return b;
        }
        let from_b = self.interfaces(b);
        let common: Vec<ClassId> = self
            .interfaces(a)
            .iter()
            .copied()
            .filter(|&i| from_b.iter().any(|&j| self.same_class(i, j)))
            .collect();
        match common.len() {
            0 => ClassId::OBJECT,
            1 => common[0],
            _ => self.build_type_with_interfaces(a, b, common),
        }
    }

    fn class_lub(
        &mut self,
        a: ClassId,
        b: ClassId,
        from_a: Option<Vec<ClassId>>,
        from_b: Option<Vec<ClassId>>,
    ) -> ClassId {
        if self.same_class(a, b) || self.is_derived_from(a, b) || self.is_derived_from(b, a) {
            let kept = self.keep_lowest_common_interfaces(from_a.as_deref(), from_b.as_deref());
            return self.build_type_with_interfaces(a, b, kept);
        }

        let super_a = self.unresolved_super_class(a);
        let super_b = self.unresolved_super_class(b);
        // Interfaces are gathered once, from the original operands.
        let from_a = from_a.unwrap_or_else(|| self.interfaces_along_chain(a));
        let from_b = from_b.unwrap_or_else(|| self.interfaces_along_chain(b));

        let (Some(sa), Some(sb)) = (super_a, super_b) else {
            let kept = self.keep_lowest_common_interfaces(Some(&from_a), Some(&from_b));
            return self.build_type_with_interfaces(ClassId::OBJECT, ClassId::OBJECT, kept);
        };
        if self.is_derived_from(sa, sb) || self.is_derived_from(sb, sa) {
            let kept = self.keep_lowest_common_interfaces(Some(&from_a), Some(&from_b));
            return self.build_type_with_interfaces(sa, sb, kept);
        }
        self.structural_lub(sa, sb, Some(from_a), Some(from_b))
    }

    /// Interfaces of `ty` that match `iface`, or failing that its nearest
    /// super-interfaces that `ty` implements.
    fn extract_most_specific_implemented_interfaces(
        &self,
        ty: ClassId,
        iface: ClassId,
        result: &mut Vec<ClassId>,
    ) {
        if self.implements_interface(ty, iface) {
            result.push(iface);
            return;
        }
        let parents = self.interfaces(iface);
        result.extend(
            parents
                .iter()
                .copied()
                .filter(|&parent| self.implements_interface(ty, parent)),
        );
        if result.is_empty() {
            for &parent in parents {
                self.extract_most_specific_implemented_interfaces(ty, parent, result);
            }
        }
    }

    /// Interfaces found on both sides, keeping only the most specific of any
    /// related pair.
    fn keep_lowest_common_interfaces(&self, from_a: Option<&[ClassId]>, from_b: Option<&[ClassId]>) -> Vec<ClassId> {
        let (Some(from_a), Some(from_b)) = (from_a, from_b) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for &iface in from_a {
            if from_b.iter().any(|&other| self.same_class(iface, other)) {
                self.add_most_specific_interface(iface, &mut result);
            }
        }
        result
    }

    fn add_most_specific_interface(&self, iface: ClassId, nodes: &mut Vec<ClassId>) {
        for i in 0..nodes.len() {
            let node = nodes[i];
            if self.same_class(node, iface) || self.implements_interface(node, iface) {
                return;
            }
            if self.implements_interface(iface, node) {
                nodes.remove(i);
                nodes.push(iface);
                return;
            }
        }
        nodes.push(iface);
    }

    /// Common type of two bases plus shared interfaces, synthesizing a
    /// virtual type unless a real one says it all.
    fn build_type_with_interfaces(&mut self, base1: ClassId, base2: ClassId, mut interfaces: Vec<ClassId>) -> ClassId {
        if interfaces.is_empty() {
            if self.same_class(base1, base2) {
                return base1;
            }
            if self.is_derived_from(base1, base2) {
                return base2;
            }
            if self.is_derived_from(base2, base1) {
                return base1;
            }
        }
        let both_object = self.same_class(base1, ClassId::OBJECT) && self.same_class(base2, ClassId::OBJECT);
        if both_object && interfaces.len() == 1 {
            return interfaces[0];
        }

        let (name, super_class) = if self.same_class(base1, base2) {
            let name = if self.same_class(base1, ClassId::OBJECT) {
                "Virtual$Object".to_owned()
            } else {
                format!("Virtual${}", self.name_str(base1))
            };
            (name, base1)
        } else {
            let super_class = if self.is_derived_from(base1, base2) {
                base2
            } else if self.is_derived_from(base2, base1) {
                base1
            } else {
                ClassId::OBJECT
            };
            let (first, second) = (self.name_str(base1), self.name_str(base2));
            let name = if first <= second {
                format!("CommonAssignOf${first}${second}")
            } else {
                format!("CommonAssignOf${second}${first}")
            };
            (name, super_class)
        };

        interfaces.retain(|&iface| {
            !(self.is_derived_from(super_class, iface) || self.implements_interface(super_class, iface))
        });
        interfaces.sort_by(|&x, &y| self.compare_interfaces(x, y));
        tracing::trace!(%name, interfaces = interfaces.len(), "virtual common type");
        self.alloc_virtual(&name, super_class, &interfaces)
    }

    /// Deterministic order: more super-interfaces first, then more methods,
    /// then by name.
    fn compare_interfaces(&self, x: ClassId, y: ClassId) -> Ordering {
        self.interfaces(y)
            .len()
            .cmp(&self.interfaces(x).len())
            .then_with(|| self.methods(y).len().cmp(&self.methods(x).len()))
            .then_with(|| self.name_str(x).cmp(self.name_str(y)))
    }

    /// Parameterize `lub` from the type arguments `a` and `b` bind for it.
    fn parameterize_lowest_upper_bound(
        &mut self,
        lub: ClassId,
        a: ClassId,
        b: ClassId,
        in_progress: &mut Vec<(ClassId, ClassId)>,
    ) -> ClassId {
        if !self.is_using_generics(lub) {
            return lub;
        }
        let holder_a = self.find_generics_type_holder_for_class(a, lub);
        let holder_b = self.find_generics_type_holder_for_class(b, lub);
        let args_a = holder_a.and_then(|h| self.generics_vec(h));
        let args_b = holder_b.and_then(|h| self.generics_vec(h));
        let (Some(args_a), Some(args_b)) = (args_a, args_b) else {
            return lub;
        };
        if args_a.is_empty() || args_a.len() != args_b.len() {
            return lub;
        }

        let mut args = Vec::with_capacity(args_a.len());
        for (ga, gb) in args_a.iter().zip(&args_b) {
            let t1 = upper_bound_if_wildcard(ga);
            let t2 = upper_bound_if_wildcard(gb);
            let basic = self.guarded_lub(t1, t2, in_progress);
            let arg = if self.same_class(t1, t2) {
                GenericsType::of(self, basic)
            } else {
                self.build_wildcard_type(&[basic])
            };
            args.push(arg);
        }
        self.make_class_safe_with_generics(lub, args)
    }

    /// `ty` as seen from `source`: `source` itself, or the interface or
    /// super class of `source` that is `ty`, carrying `source`'s type
    /// arguments.
    fn find_generics_type_holder_for_class(&mut self, source: ClassId, ty: ClassId) -> Option<ClassId> {
        ensure_sufficient_stack(|| {
            let source = self.wrapper(source);
            if self.same_class(source, ty) {
                return Some(source);
            }
            if self.is_interface(ty) {
                let face = self
                    .all_interfaces(source)
                    .into_iter()
                    .find(|&face| self.same_class(face, ty));
                if let Some(face) = face {
                    return Some(self.parameterize_type(source, face));
                }
            }

            let mut super_class = self.unresolved_super_class(source)?;
            if self.is_using_generics(super_class) {
                if let Some(slots) = self.generics_vec(super_class) {
                    let bindings = self.extract_placeholders(source);
                    let copied = slots
                        .into_iter()
                        .map(|slot| match bindings.get(&slot.name) {
                            Some(bound) if slot.placeholder => bound.clone(),
                            _ => slot,
                        })
                        .collect();
                    super_class = self.make_class_safe_with_generics(super_class, copied);
                }
            }
            self.find_generics_type_holder_for_class(super_class, ty)
        })
    }
}

/// The type a slot contributes to a LUB: a wildcard's first upper bound,
/// otherwise the slot's type.
fn upper_bound_if_wildcard(gt: &GenericsType) -> ClassId {
    if gt.wildcard {
        return gt
            .upper_bounds
            .as_ref()
            .and_then(|bounds| bounds.first().copied())
            .unwrap_or(ClassId::OBJECT);
    }
    gt.ty
}
