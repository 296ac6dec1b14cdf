//! Well-known classes.
//!
//! Bootstrapped into every [`ClassGraph`] at the fixed [`ClassId`] constants,
//! in two phases: first every record is allocated in constant order, then
//! headers that refer to other well-known classes (super classes,
//! `Comparable<Integer>`) are filled in.

use smallvec::SmallVec;

use crate::graph::{ClassRecord, Origin};
use crate::{ClassGraph, ClassId, GenericsType, Modifiers};

const PUBLIC_FINAL: Modifiers = Modifiers::PUBLIC.union(Modifiers::FINAL);
const PRIMITIVE: Modifiers = PUBLIC_FINAL.union(Modifiers::ABSTRACT);
const INTERFACE: Modifiers = Modifiers::PUBLIC
    .union(Modifiers::INTERFACE)
    .union(Modifiers::ABSTRACT);

/// (name, modifiers) in `ClassId` order.
const TABLE: [(&str, Modifiers); ClassId::WELL_KNOWN_COUNT as usize] = [
    ("java.lang.Object", Modifiers::PUBLIC),
    ("void", PRIMITIVE),
    ("boolean", PRIMITIVE),
    ("char", PRIMITIVE),
    ("byte", PRIMITIVE),
    ("short", PRIMITIVE),
    ("int", PRIMITIVE),
    ("long", PRIMITIVE),
    ("float", PRIMITIVE),
    ("double", PRIMITIVE),
    ("java.lang.Boolean", PUBLIC_FINAL),
    ("java.lang.Character", PUBLIC_FINAL),
    ("java.lang.Byte", PUBLIC_FINAL),
    ("java.lang.Short", PUBLIC_FINAL),
    ("java.lang.Integer", PUBLIC_FINAL),
    ("java.lang.Long", PUBLIC_FINAL),
    ("java.lang.Float", PUBLIC_FINAL),
    ("java.lang.Double", PUBLIC_FINAL),
    ("java.lang.Number", Modifiers::PUBLIC.union(Modifiers::ABSTRACT)),
    ("java.math.BigInteger", Modifiers::PUBLIC),
    ("java.math.BigDecimal", Modifiers::PUBLIC),
    ("java.lang.String", PUBLIC_FINAL),
    ("java.lang.CharSequence", INTERFACE),
    ("java.lang.Comparable", INTERFACE),
    ("java.io.Serializable", INTERFACE),
    ("java.lang.Cloneable", INTERFACE),
    ("?", Modifiers::PUBLIC),
];

/// Primitive / wrapper pairs.
const BOXING: [(ClassId, ClassId); 8] = [
    (ClassId::BOOLEAN, ClassId::BOOLEAN_WRAPPER),
    (ClassId::CHAR, ClassId::CHARACTER),
    (ClassId::BYTE, ClassId::BYTE_WRAPPER),
    (ClassId::SHORT, ClassId::SHORT_WRAPPER),
    (ClassId::INT, ClassId::INTEGER),
    (ClassId::LONG, ClassId::LONG_WRAPPER),
    (ClassId::FLOAT, ClassId::FLOAT_WRAPPER),
    (ClassId::DOUBLE, ClassId::DOUBLE_WRAPPER),
];

pub(crate) fn bootstrap(graph: &mut ClassGraph) {
    // Phase 1: allocate in constant order.
    for (index, &(name, modifiers)) in TABLE.iter().enumerate() {
        let is_wildcard = index == ClassId::WILDCARD.index();
        let origin = if is_wildcard {
            Origin::Synthetic
        } else {
            Origin::Reflected
        };
        let mut record = ClassRecord::new(graph.intern(name), origin);
        record.modifiers = modifiers;
        if !is_wildcard {
            record.type_class = Some(graph.intern(name));
        }
        let id = graph.alloc(record);
        debug_assert_eq!(id.index(), index);
    }

    // Phase 2: headers.
    let t = graph.type_parameter("T", &[]);
    graph.set_generics(ClassId::COMPARABLE, Some(vec![t]));

    graph.record_mut(ClassId::WILDCARD).super_class = Some(ClassId::OBJECT);
    set_header(graph, ClassId::NUMBER, ClassId::OBJECT, &[ClassId::SERIALIZABLE]);
    set_header(graph, ClassId::CHAR_SEQUENCE, ClassId::OBJECT, &[]);

    for (wrapper, parent) in [
        (ClassId::BOOLEAN_WRAPPER, ClassId::OBJECT),
        (ClassId::CHARACTER, ClassId::OBJECT),
        (ClassId::BYTE_WRAPPER, ClassId::NUMBER),
        (ClassId::SHORT_WRAPPER, ClassId::NUMBER),
        (ClassId::INTEGER, ClassId::NUMBER),
        (ClassId::LONG_WRAPPER, ClassId::NUMBER),
        (ClassId::FLOAT_WRAPPER, ClassId::NUMBER),
        (ClassId::DOUBLE_WRAPPER, ClassId::NUMBER),
        (ClassId::BIG_INTEGER, ClassId::NUMBER),
        (ClassId::BIG_DECIMAL, ClassId::NUMBER),
    ] {
        let comparable = comparable_of(graph, wrapper);
        let mut interfaces = vec![comparable];
        if parent == ClassId::OBJECT {
            interfaces.insert(0, ClassId::SERIALIZABLE);
        }
        set_header(graph, wrapper, parent, &interfaces);
    }

    let comparable_string = comparable_of(graph, ClassId::STRING);
    set_header(
        graph,
        ClassId::STRING,
        ClassId::OBJECT,
        &[ClassId::SERIALIZABLE, comparable_string, ClassId::CHAR_SEQUENCE],
    );
}

/// `Comparable<of>`.
fn comparable_of(graph: &mut ClassGraph, of: ClassId) -> ClassId {
    let arg = GenericsType::of(graph, of);
    graph.parameterized(ClassId::COMPARABLE, vec![arg])
}

/// Interfaces extend nothing; `parent` is ignored for them.
fn set_header(graph: &mut ClassGraph, id: ClassId, parent: ClassId, interfaces: &[ClassId]) {
    let is_interface = graph.is_interface(id);
    let uses_generics = interfaces.iter().any(|&i| graph.is_using_generics(i));
    let record = graph.record_mut(id);
    record.super_class = (!is_interface).then_some(parent);
    record.interfaces = SmallVec::from_slice(interfaces);
    record.uses_generics |= uses_generics;
}

impl ClassGraph {
    /// Wrapper class of a primitive; other types are returned unchanged.
    pub fn wrapper(&self, id: ClassId) -> ClassId {
        let terminal = self.terminal(id);
        BOXING
            .iter()
            .find_map(|&(prim, wrapper)| (prim == terminal).then_some(wrapper))
            .unwrap_or(id)
    }

    /// Primitive of a wrapper class; other types are returned unchanged.
    pub fn unwrapper(&self, id: ClassId) -> ClassId {
        let terminal = self.terminal(id);
        BOXING
            .iter()
            .find_map(|&(prim, wrapper)| (wrapper == terminal).then_some(prim))
            .unwrap_or(id)
    }

    /// `void` or a primitive, through redirects.
    pub fn is_primitive_type(&self, id: ClassId) -> bool {
        self.terminal(id).is_primitive()
    }

    /// Primitive numbers (not `char` or `boolean`) and their wrappers.
    pub fn is_number_type(&self, id: ClassId) -> bool {
        matches!(
            self.unwrapper(id),
            ClassId::BYTE | ClassId::SHORT | ClassId::INT | ClassId::LONG | ClassId::FLOAT | ClassId::DOUBLE
        )
    }
}
