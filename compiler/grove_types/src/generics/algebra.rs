//! Generics algebra: building substitution environments while walking the
//! class hierarchy and applying them to type references.
//!
//! None of these functions mutate their inputs. Substituted types are fresh
//! use-site references.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use grove_diagnostic::internal_error;
use grove_ir::Name;

use super::GenericsType;
use crate::stack::ensure_sufficient_stack;
use crate::{ClassGraph, ClassId};

/// Placeholder name to the type it stands for, for one substitution pass.
pub type GenericsSpec = FxHashMap<Name, ClassId>;

/// Placeholder name to the descriptor bound to it at a use site.
pub type PlaceholderMap = FxHashMap<Name, GenericsType>;

impl ClassGraph {
    /// Name a placeholder node substitutes by.
    pub(crate) fn placeholder_name(&self, id: ClassId) -> Name {
        self.generics(id)
            .and_then(|g| g.first())
            .map_or_else(|| self.unresolved_name(id), |gt| gt.name)
    }

    /// Generics spec of `node` with no outer environment.
    pub fn create_generics_spec(&self, node: ClassId) -> GenericsSpec {
        self.create_generics_spec_with(node, &GenericsSpec::default())
    }

    /// Substitute `node`'s type arguments through `base`, then key the result
    /// by the placeholder names declared on `node`'s terminal.
    ///
    /// For `class B<T> extends A<T, Long>` and `base = {T: Number}`, the
    /// spec of `A<T, Long>` is `{V: Number, W: Long}` where `A<V, W>`.
    pub fn create_generics_spec_with(&self, node: ClassId, base: &GenericsSpec) -> GenericsSpec {
        let mut spec = base.clone();
        let Some(args) = self.generics(node) else {
            return spec;
        };
        let values: SmallVec<[ClassId; 4]> = args
            .iter()
            .map(|gt| self.correct_to_generics_spec(&spec, gt))
            .collect();

        let Some(declared) = self.generics(self.terminal(node)) else {
            return spec;
        };
        spec.clear();
        for (decl, value) in declared.iter().zip(values) {
            spec.insert(decl.name, value);
        }
        spec
    }

    /// The type a descriptor stands for under `spec`.
    pub fn correct_to_generics_spec(&self, spec: &GenericsSpec, gt: &GenericsType) -> ClassId {
        if gt.placeholder {
            if let Some(&ty) = spec.get(&gt.name) {
                return ty;
            }
        }
        gt.ty
    }

    /// One-level substitution of a type reference: a placeholder is replaced
    /// by its spec entry (`Object` when missing); arrays substitute their
    /// component.
    pub fn correct_type_to_generics_spec(&mut self, spec: &GenericsSpec, ty: ClassId) -> ClassId {
        if let Some(component) = self.component(ty) {
            let corrected = self.correct_type_to_generics_spec(spec, component);
            return self.make_array(corrected);
        }
        if !self.is_generics_placeholder(ty) {
            return ty;
        }
        spec.get(&self.placeholder_name(ty))
            .copied()
            .unwrap_or(ClassId::OBJECT)
    }

    /// Deep substitution of `ty` through `spec`.
    pub fn correct_to_generics_spec_recurse(&mut self, spec: &GenericsSpec, ty: ClassId) -> ClassId {
        self.correct_to_generics_spec_recurse_excluding(spec, ty, &[])
    }

    /// Deep substitution that leaves placeholders named in `exclusions`
    /// untouched. Missing spec entries become `Object`.
    #[tracing::instrument(level = "trace", skip(self, spec, exclusions))]
    pub fn correct_to_generics_spec_recurse_excluding(
        &mut self,
        spec: &GenericsSpec,
        ty: ClassId,
        exclusions: &[Name],
    ) -> ClassId {
        ensure_sufficient_stack(|| {
            if let Some(component) = self.component(ty) {
                let corrected = self.correct_to_generics_spec_recurse_excluding(spec, component, exclusions);
                return self.make_array(corrected);
            }

            let mut ty = ty;
            if self.is_generics_placeholder(ty) {
                if exclusions.contains(&self.unresolved_name(ty)) {
                    return ty;
                }
                ty = spec
                    .get(&self.placeholder_name(ty))
                    .copied()
                    .unwrap_or(ClassId::OBJECT);
                // Placeholder-to-placeholder bindings are final.
                if self.is_generics_placeholder(ty) {
                    return ty;
                }
            }

            let Some(old) = self.generics_vec(ty) else {
                return ty;
            };
            let mut new = Vec::with_capacity(old.len());
            for gt in &old {
                let corrected = if gt.placeholder {
                    let bound = spec.get(&gt.name).copied().unwrap_or(ClassId::OBJECT);
                    GenericsType::of(self, bound)
                } else if gt.wildcard {
                    let lower = gt
                        .lower_bound
                        .map(|l| self.correct_to_generics_spec_recurse_excluding(spec, l, exclusions));
                    let upper = gt.upper_bounds.as_ref().map(|bounds| {
                        bounds
                            .iter()
                            .map(|&u| self.correct_to_generics_spec_recurse_excluding(spec, u, exclusions))
                            .collect::<Vec<_>>()
                    });
                    GenericsType {
                        upper_bounds: upper,
                        lower_bound: lower,
                        ..gt.clone()
                    }
                } else {
                    let base = self.correct_to_generics_spec(spec, gt);
                    let corrected = self.correct_to_generics_spec_recurse_excluding(spec, base, exclusions);
                    GenericsType::of(self, corrected)
                };
                new.push(corrected);
            }
            self.make_class_safe_with_generics(ty, new)
        })
    }

    /// Walk from `ty` toward its ancestor or interface `target`, recording
    /// in `spec` what each of `target`'s placeholders is bound to.
    ///
    /// When `ty` is unrelated to `target` the two are aligned structurally.
    /// Reaching a dead end while `ty` claims to inherit from `target` is an
    /// internal error.
    pub fn extract_super_class_generics(&mut self, ty: ClassId, target: ClassId, spec: &mut GenericsSpec) {
        ensure_sufficient_stack(|| {
            if ty == target {
                return;
            }
            match (self.component(ty), self.component(target)) {
                (Some(a), Some(b)) => return self.extract_super_class_generics(a, b, spec),
                (Some(_), None) if self.terminal(target) == ClassId::OBJECT => return,
                _ => {}
            }

            if self.is_generics_placeholder(target) {
                spec.insert(self.placeholder_name(target), ty);
            } else if self.same_class(ty, target) || !self.implements_interface_or_is_subclass_of(ty, target) {
                let usage = self.generics_vec(ty);
                let declaration = self.generics_vec(target);
                self.extract_generics_slots(usage.as_deref(), declaration.as_deref(), spec);
            } else {
                let Some(next) = self.super_class_toward(ty, target) else {
                    internal_error(format_args!(
                        "the type {} seems not to extend {}",
                        self.type_text(ty),
                        self.type_text(target)
                    ));
                };
                let spec_of_ty = self.create_generics_spec(ty);
                let corrected = self.correct_to_generics_spec_recurse(&spec_of_ty, next);
                self.extract_super_class_generics(corrected, target, spec);
            }
        });
    }

    fn extract_generics_slots(
        &mut self,
        usage: Option<&[GenericsType]>,
        declaration: Option<&[GenericsType]>,
        spec: &mut GenericsSpec,
    ) {
        let (Some(usage), Some(declaration)) = (usage, declaration) else {
            return;
        };
        if declaration.is_empty() || usage.len() != declaration.len() {
            return;
        }
        for (ui, di) in usage.iter().zip(declaration) {
            if di.placeholder {
                spec.insert(di.name, ui.ty);
            } else if di.wildcard {
                if ui.wildcard {
                    if let (Some(ul), Some(dl)) = (ui.lower_bound, di.lower_bound) {
                        self.extract_super_class_generics(ul, dl, spec);
                    }
                    self.extract_bound_generics(ui.upper_bounds.as_deref(), di.upper_bounds.as_deref(), spec);
                } else {
                    if let Some(dl) = di.lower_bound {
                        self.extract_super_class_generics(ui.ty, dl, spec);
                    }
                    for &upper in di.upper_bounds.iter().flatten() {
                        self.extract_super_class_generics(ui.ty, upper, spec);
                    }
                }
            } else {
                self.extract_super_class_generics(ui.ty, di.ty, spec);
            }
        }
    }

    fn extract_bound_generics(
        &mut self,
        usage: Option<&[ClassId]>,
        declaration: Option<&[ClassId]>,
        spec: &mut GenericsSpec,
    ) {
        let (Some(usage), Some(declaration)) = (usage, declaration) else {
            return;
        };
        for (&ui, &di) in usage.iter().zip(declaration) {
            if self.is_generics_placeholder(di) {
                spec.insert(self.placeholder_name(di), ui);
            } else if self.is_using_generics(di) {
                let u = self.generics_vec(ui);
                let d = self.generics_vec(di);
                self.extract_generics_slots(u.as_deref(), d.as_deref(), spec);
            }
        }
    }

    /// Re-parameterize `target` (an ancestor or interface of `hint`)
    /// consistently with `hint`'s type arguments.
    ///
    /// `parameterize_type(ArrayList<String>, List)` is `List<String>`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn parameterize_type(&mut self, hint: ClassId, target: ClassId) -> ClassId {
        if let Some(hint_component) = self.component(hint) {
            return match self.component(target) {
                Some(target_component) => {
                    let inner = self.parameterize_type(hint_component, target_component);
                    self.make_array(inner)
                }
                None => target,
            };
        }
        let spec = self.create_generics_spec(hint);
        let target_redirect = self.terminal(target);
        let mut spec = self.create_generics_spec_with(target_redirect, &spec);
        self.extract_super_class_generics(hint, target_redirect, &mut spec);
        self.correct_to_generics_spec_recurse(&spec, target_redirect)
    }

    /// Placeholder bindings of one use-site reference.
    pub fn extract_placeholders(&self, node: ClassId) -> PlaceholderMap {
        let mut map = PlaceholderMap::default();
        self.extract_placeholders_into(node, &mut map);
        map
    }

    /// Add the placeholder bindings of `node` to `map`, recursing into
    /// wildcard bounds, nested arguments and array components. The first
    /// binding recorded for a name wins.
    pub fn extract_placeholders_into(&self, node: ClassId, map: &mut PlaceholderMap) {
        ensure_sufficient_stack(|| {
            if let Some(component) = self.component(node) {
                return self.extract_placeholders_into(component, map);
            }
            if !self.is_using_generics(node) || !self.is_redirect_node(node) {
                return;
            }
            let Some(parameterized) = self.generics(node).filter(|g| !g.is_empty()) else {
                return;
            };
            let declared = match self.generics(self.terminal(node)) {
                Some(declared)
                    if !(self.is_generics_placeholder(node) && declared.len() != parameterized.len()) =>
                {
                    declared
                }
                _ => parameterized,
            };
            if declared.len() != parameterized.len() {
                internal_error(format_args!(
                    "generics arity mismatch between {} and its declaration",
                    self.type_text(node)
                ));
            }

            let mut values: SmallVec<[&GenericsType; 4]> = SmallVec::new();
            for (decl, value) in declared.iter().zip(parameterized) {
                if decl.placeholder && !map.contains_key(&decl.name) {
                    map.insert(decl.name, value.clone());
                    values.push(value);
                }
            }
            for value in values {
                if value.wildcard {
                    if let Some(lower) = value.lower_bound {
                        self.extract_placeholders_into(lower, map);
                    }
                    for &upper in value.upper_bounds.iter().flatten() {
                        self.extract_placeholders_into(upper, map);
                    }
                } else if !value.placeholder {
                    self.extract_placeholders_into(value.ty, map);
                }
            }
        });
    }

    /// Next step from `clazz` toward `goal`: the interface leading to `goal`
    /// when `goal` is an interface, otherwise the declared super class.
    pub fn next_super_class(&mut self, clazz: ClassId, goal: ClassId) -> Option<ClassId> {
        if let Some(component) = self.component(clazz) {
            let goal_component = self.component(goal)?;
            let next = self.next_super_class(component, goal_component)?;
            return Some(self.make_array(next));
        }
        if !self.is_interface(goal) {
            if self.is_interface(clazz) {
                return (!self.same_class(clazz, ClassId::OBJECT)).then_some(ClassId::OBJECT);
            }
            return self.unresolved_super_class(clazz);
        }
        let interfaces: SmallVec<[ClassId; 4]> = self.interfaces(clazz).iter().copied().collect();
        interfaces
            .into_iter()
            .find(|&iface| self.implements_interface_or_is_subclass_of(iface, goal))
            .or_else(|| self.unresolved_super_class(clazz))
    }

    fn super_class_toward(&mut self, ty: ClassId, target: ClassId) -> Option<ClassId> {
        let next = self.next_super_class(ty, target);
        if next.is_none() && self.is_primitive_type(ty) {
            let wrapper = self.wrapper(ty);
            return self.next_super_class(wrapper, target);
        }
        next
    }

    /// `? extends types...`.
    pub fn build_wildcard_type(&self, types: &[ClassId]) -> GenericsType {
        GenericsType::wildcard(self, types.to_vec())
    }

    /// Structural equality including type arguments and bounds.
    pub fn are_equal_with_generics(&self, a: Option<ClassId>, b: Option<ClassId>) -> bool {
        let (a, b) = match (a, b) {
            (None, None) => return true,
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        if a == b {
            return true;
        }
        if !self.same_class(a, b) {
            return false;
        }
        if self.is_using_generics(a) != self.is_using_generics(b) {
            return false;
        }
        match (self.generics(a), self.generics(b)) {
            (None, None) => true,
            (Some(ga), Some(gb)) => {
                ga.len() == gb.len() && ga.iter().zip(gb).all(|(x, y)| self.slots_equal(x, y))
            }
            _ => false,
        }
    }

    fn slots_equal(&self, a: &GenericsType, b: &GenericsType) -> bool {
        let shallow = a.placeholder == b.placeholder
            && a.wildcard == b.wildcard
            && a.is_resolved()
            && b.is_resolved()
            && a.name == b.name;
        if !shallow {
            return false;
        }
        // A placeholder slot's type is the placeholder node itself.
        if !a.placeholder && !self.are_equal_with_generics(Some(a.ty), Some(b.ty)) {
            return false;
        }
        if !self.are_equal_with_generics(a.lower_bound, b.lower_bound) {
            return false;
        }
        match (&a.upper_bounds, &b.upper_bounds) {
            (None, _) => true,
            (Some(ua), Some(ub)) => {
                ua.len() == ub.len()
                    && ua
                        .iter()
                        .zip(ub)
                        .all(|(&x, &y)| self.are_equal_with_generics(Some(x), Some(y)))
            }
            (Some(_), None) => false,
        }
    }

    /// Super class of `id` with `id`'s type arguments substituted in.
    ///
    /// For `class MyList<T> extends LinkedList<T>`, the parameterized super
    /// class of `MyList<String>` is `LinkedList<String>`.
    pub fn parameterized_super_class(&mut self, id: ClassId) -> Option<ClassId> {
        if self.same_class(id, ClassId::OBJECT) {
            return None;
        }
        let Some(super_class) = self.unresolved_super_class(id) else {
            return Some(ClassId::OBJECT);
        };
        if !self.is_using_generics(id) || !self.is_using_generics(super_class) {
            return Some(super_class);
        }
        let spec = self.create_generics_spec(id);
        Some(self.correct_to_generics_spec_recurse(&spec, super_class))
    }
}
