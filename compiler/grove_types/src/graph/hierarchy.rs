//! Supertype queries and reference constructors.

use smallvec::SmallVec;

use super::{ClassGraph, ClassKind, ClassRecord, Origin};
use crate::{ClassId, Modifiers};

/// Iterator over a class and its super classes, terminal by terminal.
pub struct SuperChain<'g> {
    graph: &'g ClassGraph,
    next: Option<ClassId>,
}

impl Iterator for SuperChain<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self.graph.super_class(current);
        Some(current)
    }
}

impl ClassGraph {
    /// Terminal of the declared super class.
    pub fn super_class(&self, id: ClassId) -> Option<ClassId> {
        let terminal = self.structural(id);
        self.record(terminal).super_class.map(|s| self.terminal(s))
    }

    /// Declared super class as written, type arguments included.
    pub fn unresolved_super_class(&self, id: ClassId) -> Option<ClassId> {
        let terminal = self.structural(id);
        self.record(terminal).super_class
    }

    pub fn set_super_class(&mut self, id: ClassId, super_class: ClassId) {
        let terminal = self.structural(id);
        let uses = self.is_using_generics(super_class);
        let record = self.record_mut(terminal);
        record.super_class = Some(super_class);
        record.uses_generics |= uses;
    }

    /// `id` followed by each of its super classes.
    pub fn super_chain(&self, id: ClassId) -> SuperChain<'_> {
        SuperChain {
            graph: self,
            next: Some(self.structural(id)),
        }
    }

    /// Declared interfaces of the terminal, as use-site references.
    pub fn interfaces(&self, id: ClassId) -> &[ClassId] {
        let terminal = self.structural(id);
        &self.record(terminal).interfaces
    }

    pub fn mixins(&self, id: ClassId) -> &[ClassId] {
        let terminal = self.structural(id);
        &self.record(terminal).mixins
    }

    /// Add `iface` to the terminal's interfaces unless an equal one is there.
    pub fn add_interface(&mut self, id: ClassId, iface: ClassId) {
        let terminal = self.structural(id);
        if self
            .record(terminal)
            .interfaces
            .iter()
            .any(|&existing| self.same_class(existing, iface))
        {
            return;
        }
        let uses = self.is_using_generics(iface);
        let record = self.record_mut(terminal);
        record.interfaces.push(iface);
        record.uses_generics |= uses;
    }

    pub fn add_mixin(&mut self, id: ClassId, mixin: ClassId) {
        let terminal = self.structural(id);
        if self
            .record(terminal)
            .mixins
            .iter()
            .any(|&existing| self.same_class(existing, mixin))
        {
            return;
        }
        self.record_mut(terminal).mixins.push(mixin);
    }

    /// Type equality: two references are equal iff their terminals carry the
    /// same qualified name.
    ///
    /// Use-site type arguments do not take part. A virtual common type
    /// compares by its compile-time fallback, so the LUB of `Integer` and
    /// `Double` equals `Number`.
    #[inline]
    pub fn same_class(&self, a: ClassId, b: ClassId) -> bool {
        if a == b {
            return true;
        }
        let (ta, tb) = (self.terminal(a), self.terminal(b));
        ta == tb || self.name(ta) == self.name(tb)
    }

    /// Is `other` reachable from `id` along the super class chain?
    ///
    /// Everything except `void` derives from `Object`; `void` derives only
    /// from itself.
    pub fn is_derived_from(&self, id: ClassId, other: ClassId) -> bool {
        let other = self.terminal(other);
        if self.terminal(id) == ClassId::VOID {
            return other == ClassId::VOID;
        }
        if other == ClassId::OBJECT {
            return true;
        }
        self.super_chain(id).any(|node| self.same_class(node, other))
    }

    /// Does `id` or one of its super classes declare `iface`, directly or
    /// through interface inheritance?
    pub fn implements_interface(&self, id: ClassId, iface: ClassId) -> bool {
        self.super_chain(id)
            .any(|node| self.declares_interface(node, iface))
    }

    /// Does `id` declare `iface`, directly or through one of its declared
    /// interfaces? An interface does not declare itself.
    pub fn declares_interface(&self, id: ClassId, iface: ClassId) -> bool {
        let interfaces = self.interfaces(id);
        interfaces.iter().any(|&i| self.same_class(i, iface))
            || interfaces.iter().any(|&i| self.declares_interface(i, iface))
    }

    /// `id` itself if it is an interface, then every interface it declares,
    /// transitively, in first-seen order.
    pub fn all_interfaces(&self, id: ClassId) -> Vec<ClassId> {
        let mut result = Vec::new();
        if self.is_interface(id) {
            result.push(id);
        }
        self.collect_interfaces(id, &mut result);
        result
    }

    fn collect_interfaces(&self, id: ClassId, result: &mut Vec<ClassId>) {
        for &iface in self.interfaces(id) {
            if result.iter().any(|&seen| self.same_class(seen, iface)) {
                continue;
            }
            result.push(iface);
            self.collect_interfaces(iface, result);
        }
    }

    /// Every interface declared along the super class chain (not including
    /// super-interfaces), in first-seen order.
    pub fn interfaces_along_chain(&self, id: ClassId) -> Vec<ClassId> {
        let mut result: Vec<ClassId> = Vec::new();
        for node in self.super_chain(id) {
            for &iface in self.interfaces(node) {
                if !result.iter().any(|&seen| self.same_class(seen, iface)) {
                    result.push(iface);
                }
            }
        }
        result
    }

    /// A fresh, unparameterized proxy to `id`'s terminal.
    ///
    /// Primitives are returned as-is.
    pub fn plain_node_reference(&mut self, id: ClassId) -> ClassId {
        if id.is_primitive() {
            return id;
        }
        let terminal = self.terminal(id);
        let source = self.record(terminal);
        let mut record = ClassRecord::new(source.name, Origin::Stub);
        record.modifiers = source.modifiers;
        record.uses_generics = source.uses_generics;
        record.component = source.component;
        record.redirect = Some(terminal);
        self.alloc(record)
    }

    /// Array type whose component is `id`.
    ///
    /// The array class of a terminal is created once and reused; a proxy gets
    /// its own proxy to that class so the component keeps its type arguments.
    /// That proxy is likewise created once per component.
    pub fn make_array(&mut self, id: ClassId) -> ClassId {
        let terminal = self.terminal(id);
        let array = match self.record(terminal).array_cache {
            Some(array) => array,
            None => {
                let name = format!("{}[]", self.name_str(terminal));
                let mut record = ClassRecord::new(self.intern(&name), Origin::Synthetic);
                record.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
                record.super_class = Some(ClassId::OBJECT);
                record.component = Some(terminal);
                record.interfaces = SmallVec::from_slice(&[ClassId::CLONEABLE, ClassId::SERIALIZABLE]);
                let array = self.alloc(record);
                self.record_mut(terminal).array_cache = Some(array);
                array
            }
        };
        if terminal == id {
            return array;
        }
        if let Some(&proxy) = self.array_proxies.get(&id) {
            return proxy;
        }
        let array_name = self.record(array).name;
        let mut record = ClassRecord::new(array_name, Origin::Stub);
        record.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
        record.redirect = Some(array);
        record.component = Some(id);
        record.uses_generics = self.is_using_generics(id);
        let proxy = self.alloc(record);
        self.array_proxies.insert(id, proxy);
        proxy
    }

    /// Allocate a virtual common-type record.
    pub(crate) fn alloc_virtual(
        &mut self,
        lub_name: &str,
        upper: ClassId,
        interfaces: &[ClassId],
    ) -> ClassId {
        let lub_name = self.intern(lub_name);
        let key = (lub_name, upper, SmallVec::from_slice(interfaces));
        if let Some(&interned) = self.virtual_types.get(&key) {
            return interned;
        }
        let compile_time = if self.same_class(upper, ClassId::OBJECT) && !interfaces.is_empty() {
            interfaces[0]
        } else {
            upper
        };

        let mut parts: Vec<String> = Vec::with_capacity(interfaces.len() + 1);
        if !self.same_class(upper, ClassId::OBJECT) {
            parts.push(self.name_str(upper).to_owned());
        }
        parts.extend(interfaces.iter().map(|&i| self.type_text(i)));
        let text = parts.join(" or ");

        let mut uses_generics = self.is_using_generics(upper);
        let mut generics = self.generics_vec(upper).unwrap_or_default();
        for &iface in interfaces {
            uses_generics |= self.is_using_generics(iface);
            generics.extend(self.generics(iface).unwrap_or_default().iter().cloned());
        }

        let mut record = ClassRecord::new(lub_name, Origin::Synthetic);
        record.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
        record.kind = ClassKind::Virtual(super::VirtualType {
            lub_name,
            compile_time,
            text,
        });
        record.super_class = Some(upper);
        record.interfaces = SmallVec::from_slice(interfaces);
        record.uses_generics = uses_generics;
        record.generics = uses_generics.then_some(generics);
        let id = self.alloc(record);
        self.virtual_types.insert(key, id);

        // Interface methods are visible on the common type, declared by the
        // interface they came from.
        for &iface in interfaces {
            let owner = self.terminal(iface);
            let methods = self.methods(iface).to_vec();
            for mut method in methods {
                method.declaring_class = Some(owner);
                self.add_method_node(id, method);
            }
        }
        id
    }
}
