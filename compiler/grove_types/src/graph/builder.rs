//! Constructing records: declared classes, stubs, placeholders and use-site
//! parameterizations.

use smallvec::SmallVec;

use super::{ClassGraph, ClassRecord, Origin};
use crate::{ClassId, GenericsType, Modifiers};

/// Builder for a declared (primary) or reflected class.
///
/// ```text
/// let list = graph
///     .class("java.util.List")
///     .interface()
///     .generics(vec![e])
///     .reflected("java.util.List")
///     .declare();
/// ```
#[must_use = "a class builder does nothing until `declare` is called"]
pub struct ClassBuilder<'g> {
    graph: &'g mut ClassGraph,
    name: String,
    modifiers: Modifiers,
    origin: Origin,
    super_class: Option<ClassId>,
    interfaces: Vec<ClassId>,
    generics: Option<Vec<GenericsType>>,
    type_class: Option<String>,
}

impl ClassBuilder<'_> {
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn interface(mut self) -> Self {
        self.modifiers |= Modifiers::INTERFACE | Modifiers::ABSTRACT;
        self
    }

    /// An annotation definition (`@interface`).
    pub fn annotation(self) -> Self {
        self.interface().modifiers(Modifiers::ANNOTATION)
    }

    pub fn extends(mut self, super_class: ClassId) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn implements(mut self, iface: ClassId) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Declared type parameters.
    pub fn generics(mut self, generics: Vec<GenericsType>) -> Self {
        self.generics = Some(generics);
        self
    }

    /// Mark the class as loaded from a compiled library. Its members come
    /// from the graph's [`MemberLoader`](crate::MemberLoader).
    pub fn reflected(mut self, type_class: &str) -> Self {
        self.origin = Origin::Reflected;
        self.type_class = Some(type_class.to_owned());
        self
    }

    pub fn declare(self) -> ClassId {
        let ClassBuilder {
            graph,
            name,
            modifiers,
            origin,
            super_class,
            interfaces,
            generics,
            type_class,
        } = self;

        // Classes without an explicit parent extend Object; interfaces do not.
        let super_class = super_class.or((!modifiers.is_interface()).then_some(ClassId::OBJECT));

        let mut uses_generics = generics.is_some();
        uses_generics |= super_class.is_some_and(|s| graph.is_using_generics(s));
        uses_generics |= interfaces.iter().any(|&i| graph.is_using_generics(i));

        let mut record = ClassRecord::new(graph.intern(&name), origin);
        record.modifiers = modifiers;
        record.super_class = super_class;
        record.interfaces = SmallVec::from_vec(interfaces);
        record.generics = generics;
        record.uses_generics = uses_generics;
        record.type_class = type_class.map(|t| graph.intern(&t));
        if origin == Origin::Primary {
            record.members.get_or_init(Default::default);
        }
        let id = graph.alloc(record);
        tracing::trace!(class = %name, ?origin, "class declared");
        id
    }
}

impl ClassGraph {
    /// Start declaring a class named `name`.
    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder {
            graph: self,
            name: name.to_owned(),
            modifiers: Modifiers::PUBLIC,
            origin: Origin::Primary,
            super_class: None,
            interfaces: Vec::new(),
            generics: None,
            type_class: None,
        }
    }

    /// A dangling reference to `name`, to be bound by [`resolve_stubs`](Self::resolve_stubs)
    /// or an explicit [`set_redirect`](Self::set_redirect).
    pub fn make_stub(&mut self, name: &str) -> ClassId {
        let record = ClassRecord::new(self.intern(name), Origin::Stub);
        let id = self.alloc(record);
        self.pending_stubs_mut().push(id);
        id
    }

    /// Resolver pass: bind every dangling stub whose name matches a declared
    /// or reflected class. Returns the stubs that are still dangling.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve_stubs(&mut self) -> Vec<ClassId> {
        let pending = std::mem::take(self.pending_stubs_mut());
        let mut unresolved = Vec::new();
        for stub in pending {
            if self.is_redirect_node(stub) {
                continue;
            }
            match self.find_class(self.lookup(self.unresolved_name(stub))) {
                Some(target) => self.set_redirect(stub, target),
                None => unresolved.push(stub),
            }
        }
        tracing::debug!(unresolved = unresolved.len(), "stubs resolved");
        self.pending_stubs_mut().extend(unresolved.iter().copied());
        unresolved
    }

    /// A placeholder node `name` bound to `Object`.
    ///
    /// Its single generics slot names the placeholder, so the node renders as
    /// `name` and substitutes by that name.
    pub fn placeholder(&mut self, name: &str) -> ClassId {
        let name = self.intern(name);
        let mut record = ClassRecord::new(name, Origin::Stub);
        record.redirect = Some(ClassId::OBJECT);
        record.placeholder = true;
        record.uses_generics = true;
        let id = self.alloc(record);
        let slot = GenericsType {
            ty: id,
            upper_bounds: None,
            lower_bound: None,
            name,
            placeholder: true,
            wildcard: false,
            resolved: false,
        };
        self.record_mut(id).generics = Some(vec![slot]);
        id
    }

    /// Declaration-site type parameter `name extends bounds...`.
    pub fn type_parameter(&mut self, name: &str, bounds: &[ClassId]) -> GenericsType {
        let node = self.placeholder(name);
        self.bound_placeholder(node, bounds)
    }

    /// Attach upper bounds to an existing placeholder and return its
    /// declaration-site descriptor. Lets a bound mention the placeholder
    /// itself (`T extends Comparable<? super T>`).
    pub fn bound_placeholder(&mut self, node: ClassId, bounds: &[ClassId]) -> GenericsType {
        let upper = (!bounds.is_empty()).then(|| bounds.to_vec());
        if let Some(&first) = bounds.first() {
            self.set_redirect(node, first);
        }
        let mut descriptor = GenericsType::of(self, node);
        descriptor.upper_bounds = upper;
        if let Some(slots) = self.record_mut(node).generics.as_mut() {
            for slot in slots {
                slot.upper_bounds.clone_from(&descriptor.upper_bounds);
            }
        }
        descriptor
    }

    /// `base<args...>` as a fresh use-site reference.
    ///
    /// An empty argument list yields a plain reference.
    pub fn parameterized(&mut self, base: ClassId, args: Vec<GenericsType>) -> ClassId {
        self.make_class_safe_with_generics(base, args)
    }

    /// Convenience for `base<A, B, ...>` with concrete arguments.
    pub fn parameterized_with(&mut self, base: ClassId, args: &[ClassId]) -> ClassId {
        let args = args.iter().map(|&a| GenericsType::of(self, a)).collect();
        self.make_class_safe_with_generics(base, args)
    }

    /// Use-site reference to `ty` carrying `args`, preserving array-ness and
    /// placeholder-ness.
    ///
    /// References are interned by terminal and arguments: every request for
    /// `List<String>` yields the same record. Callers that need a node of
    /// their own to rewire take a [`plain_node_reference`](Self::plain_node_reference).
    pub fn make_class_safe_with_generics(&mut self, ty: ClassId, args: Vec<GenericsType>) -> ClassId {
        if let Some(component) = self.component(ty) {
            let inner = self.make_class_safe_with_generics(component, args);
            return self.make_array(inner);
        }
        if ty.is_primitive() {
            return ty;
        }
        let placeholder = (!args.is_empty() && self.is_generics_placeholder(ty)).then(|| self.record(ty).name);
        let key = (self.terminal(ty), placeholder, args);
        if let Some(&interned) = self.use_sites.get(&key) {
            return interned;
        }

        let plain = self.plain_node_reference(ty);
        if !key.2.is_empty() {
            let record = self.record_mut(plain);
            record.generics = Some(key.2.clone());
            record.uses_generics = true;
            if let Some(name) = key.1 {
                record.placeholder = true;
                record.name = name;
            }
        }
        self.use_sites.insert(key, plain);
        plain
    }
}
