//! Member queries and mutation.
//!
//! Every accessor forwards to the terminal record and pays the lazy
//! population check there.

use grove_diagnostic::internal_error;
use grove_ir::{Name, Span};

use super::ClassGraph;
use crate::{
    AnnotationId, AnnotationNode, ClassId, ClassMembers, ConstructorNode, ConstructorRef,
    FieldNode, FieldRef, MemberRef, MethodNode, MethodRef, PropertyNode, PropertyRef,
};

fn slot(index: usize) -> u32 {
    u32::try_from(index).unwrap_or_else(|_| internal_error("member index exceeds u32"))
}

impl ClassGraph {
    fn members(&self, id: ClassId) -> &ClassMembers {
        let terminal = self.structural(id);
        self.members_of_terminal(terminal)
    }

    fn members_mut(&mut self, id: ClassId) -> (ClassId, &mut ClassMembers) {
        let terminal = self.structural(id);
        self.members_of_terminal(terminal);
        match self.record_mut(terminal).members.get_mut() {
            Some(members) => (terminal, members),
            None => internal_error("member body vanished after initialization"),
        }
    }

    pub fn fields(&self, id: ClassId) -> &[FieldNode] {
        &self.members(id).fields
    }

    pub fn methods(&self, id: ClassId) -> &[MethodNode] {
        &self.members(id).methods
    }

    pub fn constructors(&self, id: ClassId) -> &[ConstructorNode] {
        &self.members(id).constructors
    }

    pub fn properties(&self, id: ClassId) -> &[PropertyNode] {
        &self.members(id).properties
    }

    // === Methods ===

    pub fn method_node(&self, r: MethodRef) -> &MethodNode {
        match self.members(r.owner).methods.get(r.index as usize) {
            Some(m) => m,
            None => internal_error(format_args!("stale method handle {r:?}")),
        }
    }

    pub fn method_mut(&mut self, r: MethodRef) -> &mut MethodNode {
        match self.members_mut(r.owner).1.methods.get_mut(r.index as usize) {
            Some(m) => m,
            None => internal_error(format_args!("stale method handle {r:?}")),
        }
    }

    /// Methods named `name` declared directly on `id`.
    pub fn declared_methods(&self, id: ClassId, name: Name) -> impl Iterator<Item = MethodRef> + '_ {
        let owner = self.structural(id);
        self.members(owner)
            .methods
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.name == name)
            .map(move |(i, _)| MethodRef {
                owner,
                index: slot(i),
            })
    }

    /// Declared method with exactly these parameter types.
    pub fn declared_method(&self, id: ClassId, name: Name, params: &[ClassId]) -> Option<MethodRef> {
        self.declared_methods(id, name)
            .find(|&r| self.parameters_equal(self.method_node(r).parameter_types(), params))
    }

    /// Like [`declared_method`](Self::declared_method), walking super classes.
    pub fn method(&self, id: ClassId, name: Name, params: &[ClassId]) -> Option<MethodRef> {
        self.super_chain(id)
            .find_map(|node| self.declared_method(node, name, params))
    }

    /// Methods of `id` and all its super classes, nearest first.
    pub fn all_declared_methods(&self, id: ClassId) -> Vec<MethodRef> {
        let mut result = Vec::new();
        for node in self.super_chain(id) {
            let count = self.members_of_terminal(node).methods.len();
            result.extend((0..count).map(|i| MethodRef {
                owner: node,
                index: slot(i),
            }));
        }
        result
    }

    /// Could a call to `name` resolve against `id`?
    ///
    /// Name-only: arity, varargs and default arguments are not considered.
    pub fn has_possible_method(&self, id: ClassId, name: Name) -> bool {
        self.super_chain(id)
            .any(|node| self.members_of_terminal(node).methods.iter().any(|m| m.name == name))
            || self
                .all_interfaces(id)
                .into_iter()
                .any(|iface| self.methods(iface).iter().any(|m| m.name == name))
    }

    fn parameters_equal(&self, declared: impl Iterator<Item = ClassId>, params: &[ClassId]) -> bool {
        let mut count = 0;
        for ty in declared {
            match params.get(count) {
                Some(&p) if self.same_class(ty, p) => count += 1,
                _ => return false,
            }
        }
        count == params.len()
    }

    /// Append `method` to the terminal's methods.
    pub fn add_method_node(&mut self, id: ClassId, mut method: MethodNode) -> MethodRef {
        let (owner, members) = self.members_mut(id);
        method.declaring_class.get_or_insert(owner);
        members.methods.push(method);
        MethodRef {
            owner,
            index: slot(members.methods.len() - 1),
        }
    }

    /// Add `method` unless a method with the same name and parameter types is
    /// already declared, in which case that one is returned and `method` is
    /// dropped.
    pub fn add_method(&mut self, id: ClassId, method: MethodNode) -> MethodRef {
        let params: Vec<ClassId> = method.parameter_types().collect();
        if let Some(existing) = self.declared_method(id, method.name, &params) {
            return existing;
        }
        self.add_method_node(id, method)
    }

    // === Fields ===

    pub fn field_node(&self, r: FieldRef) -> &FieldNode {
        match self.members(r.owner).fields.get(r.index as usize) {
            Some(f) => f,
            None => internal_error(format_args!("stale field handle {r:?}")),
        }
    }

    pub fn field_mut(&mut self, r: FieldRef) -> &mut FieldNode {
        match self.members_mut(r.owner).1.fields.get_mut(r.index as usize) {
            Some(f) => f,
            None => internal_error(format_args!("stale field handle {r:?}")),
        }
    }

    pub fn add_field(&mut self, id: ClassId, field: FieldNode) -> FieldRef {
        let (owner, members) = self.members_mut(id);
        members.fields.push(field);
        FieldRef {
            owner,
            index: slot(members.fields.len() - 1),
        }
    }

    pub fn declared_field(&self, id: ClassId, name: Name) -> Option<FieldRef> {
        let owner = self.structural(id);
        self.members(owner)
            .fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| FieldRef {
                owner,
                index: slot(i),
            })
    }

    /// Field visible on `id`, walking super classes.
    pub fn field(&self, id: ClassId, name: Name) -> Option<FieldRef> {
        self.super_chain(id)
            .find_map(|node| self.declared_field(node, name))
    }

    // === Constructors ===

    pub fn constructor_node(&self, r: ConstructorRef) -> &ConstructorNode {
        match self.members(r.owner).constructors.get(r.index as usize) {
            Some(c) => c,
            None => internal_error(format_args!("stale constructor handle {r:?}")),
        }
    }

    pub fn constructor_mut(&mut self, r: ConstructorRef) -> &mut ConstructorNode {
        match self.members_mut(r.owner).1.constructors.get_mut(r.index as usize) {
            Some(c) => c,
            None => internal_error(format_args!("stale constructor handle {r:?}")),
        }
    }

    pub fn add_constructor(&mut self, id: ClassId, constructor: ConstructorNode) -> ConstructorRef {
        let (owner, members) = self.members_mut(id);
        members.constructors.push(constructor);
        ConstructorRef {
            owner,
            index: slot(members.constructors.len() - 1),
        }
    }

    pub fn declared_constructor(&self, id: ClassId, params: &[ClassId]) -> Option<ConstructorRef> {
        let owner = self.structural(id);
        self.members(owner)
            .constructors
            .iter()
            .position(|c| self.parameters_equal(c.parameters.iter().map(|p| p.ty), params))
            .map(|i| ConstructorRef {
                owner,
                index: slot(i),
            })
    }

    // === Properties ===

    pub fn property_node(&self, r: PropertyRef) -> &PropertyNode {
        match self.members(r.owner).properties.get(r.index as usize) {
            Some(p) => p,
            None => internal_error(format_args!("stale property handle {r:?}")),
        }
    }

    pub fn property_mut(&mut self, r: PropertyRef) -> &mut PropertyNode {
        match self.members_mut(r.owner).1.properties.get_mut(r.index as usize) {
            Some(p) => p,
            None => internal_error(format_args!("stale property handle {r:?}")),
        }
    }

    /// Add a property. Its backing field is added too unless a field of that
    /// name is already declared; the property's annotations move onto the
    /// backing field.
    pub fn add_property(&mut self, id: ClassId, mut property: PropertyNode) -> PropertyRef {
        let annotations = std::mem::take(&mut property.field.annotations);
        let field = match self.declared_field(id, property.name()) {
            Some(field) => field,
            None => self.add_field(id, property.field.clone()),
        };
        self.field_mut(field).annotations.extend(annotations);

        let (owner, members) = self.members_mut(id);
        members.properties.push(property);
        PropertyRef {
            owner,
            index: slot(members.properties.len() - 1),
        }
    }

    fn backing_field(&self, r: PropertyRef) -> Option<FieldRef> {
        self.declared_field(r.owner, self.property_node(r).name())
    }

    pub fn property(&self, id: ClassId, name: Name) -> Option<PropertyRef> {
        let owner = self.structural(id);
        self.members(owner)
            .properties
            .iter()
            .position(|p| p.name() == name)
            .map(|i| PropertyRef {
                owner,
                index: slot(i),
            })
    }

    // === Annotations ===

    /// Create an annotation occurrence with a fresh identity. It is not
    /// attached to anything until passed to [`add_annotation`](Self::add_annotation).
    pub fn new_annotation(&mut self, class: ClassId, span: Span) -> AnnotationNode {
        AnnotationNode {
            id: AnnotationId::from_raw(self.next_annotation_id()),
            class,
            members: Vec::new(),
            span,
        }
    }

    pub fn annotations(&self, target: MemberRef) -> &[AnnotationNode] {
        match target {
            MemberRef::Class(id) => &self.record(self.terminal(id)).annotations,
            MemberRef::Method(r) => &self.method_node(r).annotations,
            MemberRef::Field(r) => &self.field_node(r).annotations,
            MemberRef::Constructor(r) => &self.constructor_node(r).annotations,
            MemberRef::Property(r) => match self.backing_field(r) {
                Some(field) => &self.field_node(field).annotations,
                None => &self.property_node(r).field.annotations,
            },
        }
    }

    pub fn add_annotation(&mut self, target: MemberRef, annotation: AnnotationNode) {
        match target {
            MemberRef::Class(id) => {
                let terminal = self.terminal(id);
                self.record_mut(terminal).annotations.push(annotation);
            }
            MemberRef::Method(r) => self.method_mut(r).annotations.push(annotation),
            MemberRef::Field(r) => self.field_mut(r).annotations.push(annotation),
            MemberRef::Constructor(r) => self.constructor_mut(r).annotations.push(annotation),
            MemberRef::Property(r) => match self.backing_field(r) {
                Some(field) => self.field_mut(field).annotations.push(annotation),
                None => self.property_mut(r).field.annotations.push(annotation),
            },
        }
    }

    /// Every annotatable node of a class: the class itself, then its
    /// methods, fields and constructors in declaration order. Property
    /// annotations live on the backing field.
    pub fn annotatable_nodes(&self, id: ClassId) -> Vec<MemberRef> {
        let owner = self.structural(id);
        let members = self.members_of_terminal(owner);
        let mut nodes = vec![MemberRef::Class(owner)];
        nodes.extend((0..members.methods.len()).map(|i| {
            MemberRef::Method(MethodRef {
                owner,
                index: slot(i),
            })
        }));
        nodes.extend((0..members.fields.len()).map(|i| {
            MemberRef::Field(FieldRef {
                owner,
                index: slot(i),
            })
        }));
        nodes.extend((0..members.constructors.len()).map(|i| {
            MemberRef::Constructor(ConstructorRef {
                owner,
                index: slot(i),
            })
        }));
        nodes
    }
}
