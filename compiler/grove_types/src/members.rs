//! Member nodes: methods, fields, constructors, properties and annotations.
//!
//! Members live in the [`ClassMembers`] body of their declaring class's
//! terminal record and are addressed from outside the graph by small
//! `(owner, index)` handles. Member types are plain [`ClassId`]s; for
//! reflected classes they are the erased types.

use grove_ir::{Block, Expr, Name, Span};

use crate::{ClassId, Modifiers};

/// Unique identity of one annotation occurrence.
///
/// Two `@Foo` annotations on different members are different ids even though
/// they name the same annotation class.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct AnnotationId(u32);

impl AnnotationId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        AnnotationId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Constant value of an annotation member.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Class(ClassId),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One `@Annotation(member = value, ...)` occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationNode {
    pub id: AnnotationId,
    /// The annotation class.
    pub class: ClassId,
    pub members: Vec<(Name, AnnotationValue)>,
    pub span: Span,
}

impl AnnotationNode {
    pub fn member(&self, name: Name) -> Option<&AnnotationValue> {
        self.members
            .iter()
            .find_map(|(n, v)| (*n == name).then_some(v))
    }

    #[must_use]
    pub fn with_member(mut self, name: Name, value: AnnotationValue) -> Self {
        self.members.push((name, value));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: Name,
    pub ty: ClassId,
    pub default_value: Option<Expr>,
}

impl Parameter {
    pub fn new(name: Name, ty: ClassId) -> Self {
        Parameter {
            name,
            ty,
            default_value: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodNode {
    pub name: Name,
    pub modifiers: Modifiers,
    pub return_type: ClassId,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<ClassId>,
    pub code: Option<Block>,
    pub annotations: Vec<AnnotationNode>,
    /// Class the method was declared in. Differs from the owning record for
    /// methods copied onto synthesized common types.
    pub declaring_class: Option<ClassId>,
    pub span: Span,
}

impl MethodNode {
    pub fn new(name: Name, modifiers: Modifiers, return_type: ClassId, parameters: Vec<Parameter>) -> Self {
        MethodNode {
            name,
            modifiers,
            return_type,
            parameters,
            exceptions: Vec::new(),
            code: None,
            annotations: Vec::new(),
            declaring_class: None,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: Block) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_exceptions(mut self, exceptions: Vec<ClassId>) -> Self {
        self.exceptions = exceptions;
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.parameters.iter().map(|p| p.ty)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldNode {
    pub name: Name,
    pub modifiers: Modifiers,
    pub ty: ClassId,
    pub initial_value: Option<Expr>,
    pub annotations: Vec<AnnotationNode>,
    pub span: Span,
}

impl FieldNode {
    pub fn new(name: Name, modifiers: Modifiers, ty: ClassId) -> Self {
        FieldNode {
            name,
            modifiers,
            ty,
            initial_value: None,
            annotations: Vec::new(),
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_initial_value(mut self, value: Expr) -> Self {
        self.initial_value = Some(value);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorNode {
    pub modifiers: Modifiers,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<ClassId>,
    pub code: Option<Block>,
    pub annotations: Vec<AnnotationNode>,
    pub span: Span,
}

impl ConstructorNode {
    pub fn new(modifiers: Modifiers, parameters: Vec<Parameter>) -> Self {
        ConstructorNode {
            modifiers,
            parameters,
            exceptions: Vec::new(),
            code: None,
            annotations: Vec::new(),
            span: Span::DUMMY,
        }
    }
}

/// A property: a backing field plus optional accessor bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyNode {
    pub field: FieldNode,
    pub modifiers: Modifiers,
    pub getter: Option<Block>,
    pub setter: Option<Block>,
}

impl PropertyNode {
    pub fn new(field: FieldNode, modifiers: Modifiers) -> Self {
        PropertyNode {
            field,
            modifiers,
            getter: None,
            setter: None,
        }
    }

    pub fn name(&self) -> Name {
        self.field.name
    }

    pub fn ty(&self) -> ClassId {
        self.field.ty
    }
}

/// Member body of a class record.
///
/// Populated eagerly for source classes and on first access for reflected
/// ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassMembers {
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
    pub constructors: Vec<ConstructorNode>,
    pub properties: Vec<PropertyNode>,
}

macro_rules! member_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub struct $name {
            /// Terminal class whose body holds the member.
            pub owner: ClassId,
            pub index: u32,
        }
    };
}

member_ref!(
    /// Handle to a method in its owner's body.
    MethodRef
);
member_ref!(FieldRef);
member_ref!(ConstructorRef);
member_ref!(PropertyRef);

/// Anything an annotation can be attached to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberRef {
    Class(ClassId),
    Method(MethodRef),
    Field(FieldRef),
    Constructor(ConstructorRef),
    Property(PropertyRef),
}

impl MemberRef {
    /// The class that owns this member (or the class itself).
    pub fn owner(self) -> ClassId {
        match self {
            MemberRef::Class(id) => id,
            MemberRef::Method(r) => r.owner,
            MemberRef::Field(r) => r.owner,
            MemberRef::Constructor(r) => r.owner,
            MemberRef::Property(r) => r.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_member_lookup() {
        let value = Name::from_raw(7);
        let node = AnnotationNode {
            id: AnnotationId::from_raw(0),
            class: ClassId::from_raw(40),
            members: Vec::new(),
            span: Span::DUMMY,
        }
        .with_member(value, AnnotationValue::Str("x".to_owned()));

        assert_eq!(node.member(value).and_then(AnnotationValue::as_str), Some("x"));
        assert_eq!(node.member(Name::from_raw(8)), None);
    }

    #[test]
    fn member_ref_owner() {
        let owner = ClassId::from_raw(30);
        let m = MemberRef::Method(MethodRef { owner, index: 2 });
        assert_eq!(m.owner(), owner);
        assert_eq!(MemberRef::Class(owner).owner(), owner);
    }
}
