use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::{ConstructorNode, FieldNode, MemberRef, MethodNode, Parameter, PropertyNode};
use grove_ir::Span;
use pretty_assertions::assert_eq;

fn method(graph: &ClassGraph, name: &str, params: &[ClassId]) -> MethodNode {
    let params = params
        .iter()
        .enumerate()
        .map(|(i, &ty)| Parameter::new(graph.intern(&format!("p{i}")), ty))
        .collect();
    MethodNode::new(graph.intern(name), Modifiers::PUBLIC, ClassId::VOID, params)
}

// === Redirects ===

#[test]
fn stub_binds_to_terminal() {
    let mut graph = ClassGraph::new();
    let stub = graph.make_stub("com.example.Foo");
    let foo = graph.class("com.example.Foo").declare();
    assert!(!graph.is_resolved(stub));

    graph.set_redirect(stub, foo);
    assert_eq!(graph.terminal(stub), foo);
    assert!(graph.same_class(stub, foo));
    assert!(graph.is_resolved(stub));

    // Rebinding to the same target changes nothing.
    graph.set_redirect(stub, foo);
    assert_eq!(graph.redirect_of(stub), Some(foo));
}

#[test]
fn redirect_through_a_chain_binds_the_terminal() {
    let mut graph = ClassGraph::new();
    let first = graph.make_stub("Foo");
    let second = graph.make_stub("Foo");
    let foo = graph.class("Foo").declare();
    graph.set_redirect(second, foo);
    graph.set_redirect(first, second);
    assert_eq!(graph.redirect_of(first), Some(foo));
}

#[test]
fn redirect_to_self_is_a_no_op() {
    let mut graph = ClassGraph::new();
    let stub = graph.make_stub("Foo");
    graph.set_redirect(stub, stub);
    assert_eq!(graph.redirect_of(stub), None);
}

#[test]
#[should_panic(expected = "tried to set a redirect for the primary class Foo")]
fn redirecting_a_primary_class_is_internal_error() {
    let mut graph = ClassGraph::new();
    let foo = graph.class("Foo").declare();
    graph.set_redirect(foo, ClassId::STRING);
}

#[test]
#[should_panic(expected = "queried before it was resolved")]
fn querying_a_dangling_stub_is_internal_error() {
    let mut graph = ClassGraph::new();
    let stub = graph.make_stub("com.example.Missing");
    let _ = graph.super_class(stub);
}

#[test]
fn resolver_pass_binds_known_names() {
    let mut graph = ClassGraph::new();
    let known = graph.make_stub("com.example.Known");
    let missing = graph.make_stub("com.example.Missing");
    let target = graph.class("com.example.Known").declare();

    let unresolved = graph.resolve_stubs();
    assert_eq!(unresolved, vec![missing]);
    assert_eq!(graph.terminal(known), target);
    assert!(!graph.is_resolved(missing));

    // The leftover stub is retried on the next pass.
    let late = graph.class("com.example.Missing").declare();
    assert!(graph.resolve_stubs().is_empty());
    assert_eq!(graph.terminal(missing), late);
}

#[test]
fn names() {
    let mut graph = ClassGraph::new();
    let stub = graph.make_stub("Foo");
    let foo = graph.class("com.example.Foo").declare();
    graph.set_redirect(stub, foo);

    assert_eq!(graph.name_str(stub), "com.example.Foo");
    assert_eq!(graph.lookup(graph.unresolved_name(stub)), "Foo");
    assert_eq!(graph.find_class("com.example.Foo"), Some(foo));
    assert_eq!(graph.find_class("Foo"), None);
    assert_eq!(graph.lub_name(foo), None);
}

// === Hierarchy ===

#[test]
fn derivation_and_interfaces() {
    let mut graph = ClassGraph::new();
    let x = graph.class("X").interface().declare();
    let sub = graph.class("Sub").interface().implements(x).declare();
    let p = graph.class("P").implements(sub).declare();
    let q = graph.class("Q").extends(p).declare();

    assert!(graph.is_derived_from(q, p));
    assert!(graph.is_derived_from(q, ClassId::OBJECT));
    assert!(!graph.is_derived_from(p, q));
    assert!(!graph.is_derived_from(ClassId::VOID, ClassId::OBJECT));
    assert!(graph.is_derived_from(ClassId::VOID, ClassId::VOID));

    assert!(graph.declares_interface(p, x));
    assert!(!graph.declares_interface(q, x));
    assert!(graph.implements_interface(q, x));
    assert!(graph.implements_interface(q, sub));
    assert!(!graph.declares_interface(sub, sub));

    assert_eq!(graph.all_interfaces(sub), vec![sub, x]);
    assert_eq!(graph.all_interfaces(p), vec![sub, x]);
    assert!(graph.all_interfaces(q).is_empty());
    assert_eq!(graph.interfaces_along_chain(q), vec![sub]);

    let chain: Vec<_> = graph.super_chain(q).collect();
    assert_eq!(chain, vec![q, p, ClassId::OBJECT]);
    assert_eq!(graph.super_class(x), None);
}

#[test]
fn add_interface_deduplicates() {
    let mut graph = ClassGraph::new();
    let x = graph.class("X").interface().declare();
    let p = graph.class("P").declare();
    let proxy = graph.plain_node_reference(x);
    graph.add_interface(p, x);
    graph.add_interface(p, proxy);
    assert_eq!(graph.interfaces(p), &[x]);
}

#[test]
fn plain_reference() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let plain = graph.plain_node_reference(p);
    assert_ne!(plain, p);
    assert!(graph.same_class(plain, p));
    assert!(graph.is_redirect_node(plain));
    assert_eq!(graph.plain_node_reference(ClassId::INT), ClassId::INT);
}

#[test]
fn arrays_are_cached_per_terminal() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let first = graph.make_array(p);
    let second = graph.make_array(p);
    assert_eq!(first, second);
    assert!(graph.is_array(first));
    assert_eq!(graph.component(first), Some(p));
    assert_eq!(graph.name_str(first), "P[]");
    assert!(graph.implements_interface(first, ClassId::CLONEABLE));
    assert!(graph.is_derived_from(first, ClassId::OBJECT));

    let nested = graph.make_array(first);
    assert_eq!(graph.name_str(nested), "P[][]");
    assert_eq!(graph.type_text(nested), "P[][]");
}

#[test]
fn array_of_a_parameterization_keeps_its_arguments() {
    let mut graph = ClassGraph::new();
    let e = graph.type_parameter("E", &[]);
    let list = graph.class("java.util.List").interface().generics(vec![e]).declare();
    let strings = graph.parameterized_with(list, &[ClassId::STRING]);

    let raw_array = graph.make_array(list);
    let array = graph.make_array(strings);
    assert_ne!(array, raw_array);
    assert!(graph.same_class(array, raw_array));
    assert_eq!(graph.component(array), Some(strings));
    assert_eq!(graph.type_text(array), "java.util.List<java.lang.String>[]");
}

// === Rendering ===

#[test]
fn type_text_renders_arguments_and_bounds() {
    let mut graph = ClassGraph::new();
    let k = graph.type_parameter("K", &[]);
    let v = graph.type_parameter("V", &[ClassId::NUMBER]);
    assert_eq!(graph.generics_text(&k), "K");
    assert_eq!(graph.generics_text(&v), "V extends java.lang.Number");

    let (k_node, v_node) = (k.ty, v.ty);
    let map = graph.class("java.util.Map").interface().generics(vec![k, v]).declare();
    assert_eq!(graph.type_text(map), "java.util.Map<K, V extends java.lang.Number>");

    let lower = GenericsType::wildcard_super(&graph, ClassId::INTEGER);
    let used = graph.parameterized(map, vec![GenericsType::of(&graph, k_node), lower]);
    assert_eq!(graph.type_text(used), "java.util.Map<K, ? super java.lang.Integer>");
    assert_eq!(graph.type_text(v_node), "V");

    let both = graph.type_parameter("T", &[ClassId::NUMBER, ClassId::COMPARABLE]);
    assert_eq!(
        graph.generics_text(&both),
        "T extends java.lang.Number & java.lang.Comparable<T>"
    );
}

// === Members ===

#[test]
fn add_method_is_idempotent() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let first = graph.add_method(p, method(&graph, "run", &[ClassId::INT]));
    let second = graph.add_method(p, method(&graph, "run", &[ClassId::INT]));
    assert_eq!(first, second);
    assert_eq!(graph.methods(p).len(), 1);

    let overload = graph.add_method(p, method(&graph, "run", &[ClassId::STRING]));
    assert_ne!(overload, first);
    assert_eq!(graph.methods(p).len(), 2);
    assert_eq!(graph.method_node(first).declaring_class, Some(p));
}

#[test]
fn method_lookup_walks_super_classes() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let q = graph.class("Q").extends(p).declare();
    let inherited = graph.add_method(p, method(&graph, "run", &[]));
    let own = graph.add_method(q, method(&graph, "stop", &[]));
    let run = graph.intern("run");

    assert_eq!(graph.declared_method(q, run, &[]), None);
    assert_eq!(graph.method(q, run, &[]), Some(inherited));
    assert_eq!(graph.all_declared_methods(q), vec![own, inherited]);
    assert!(graph.has_possible_method(q, run));
    assert!(!graph.has_possible_method(q, graph.intern("jump")));
}

#[test]
fn has_possible_method_sees_interfaces() {
    let mut graph = ClassGraph::new();
    let x = graph.class("X").interface().declare();
    let p = graph.class("P").implements(x).declare();
    graph.add_method(x, method(&graph, "size", &[]));
    assert!(graph.has_possible_method(p, graph.intern("size")));
}

#[test]
fn fields_and_constructors() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let q = graph.class("Q").extends(p).declare();
    let count = graph.intern("count");
    let field = graph.add_field(p, FieldNode::new(count, Modifiers::PRIVATE, ClassId::INT));

    assert_eq!(graph.declared_field(q, count), None);
    assert_eq!(graph.field(q, count), Some(field));
    assert_eq!(graph.field_node(field).ty, ClassId::INT);

    let params = vec![Parameter::new(graph.intern("n"), ClassId::INT)];
    let ctor = graph.add_constructor(p, ConstructorNode::new(Modifiers::PUBLIC, params));
    assert_eq!(graph.declared_constructor(p, &[ClassId::INT]), Some(ctor));
    assert_eq!(graph.declared_constructor(p, &[]), None);
}

#[test]
fn members_are_shared_through_proxies() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let proxy = graph.plain_node_reference(p);
    let added = graph.add_method(proxy, method(&graph, "run", &[]));
    assert_eq!(added.owner, p);
    assert_eq!(graph.methods(p).len(), 1);
}

// === Properties and annotations ===

#[test]
fn property_annotations_live_on_the_backing_field() {
    let mut graph = ClassGraph::new();
    let marker = graph.class("Marker").annotation().declare();
    let p = graph.class("P").declare();
    let name = graph.intern("name");

    let mut field = FieldNode::new(name, Modifiers::PRIVATE, ClassId::STRING);
    field.annotations.push(graph.new_annotation(marker, Span::new(1, 7)));
    let property = graph.add_property(p, PropertyNode::new(field, Modifiers::PUBLIC));

    assert_eq!(graph.property(p, name), Some(property));
    assert_eq!(graph.fields(p).len(), 1);
    assert_eq!(graph.annotations(MemberRef::Property(property)).len(), 1);
    let Some(backing) = graph.declared_field(p, name) else {
        panic!("backing field should exist");
    };
    assert_eq!(graph.annotations(MemberRef::Field(backing)).len(), 1);

    // Annotatable nodes never report the property separately.
    let annotated: Vec<_> = graph
        .annotatable_nodes(p)
        .into_iter()
        .filter(|&node| !graph.annotations(node).is_empty())
        .collect();
    assert_eq!(annotated, vec![MemberRef::Field(backing)]);
}

#[test]
fn annotations_get_unique_ids() {
    let mut graph = ClassGraph::new();
    let marker = graph.class("Marker").annotation().declare();
    let p = graph.class("P").declare();
    let first = graph.new_annotation(marker, Span::DUMMY);
    let second = graph.new_annotation(marker, Span::DUMMY);
    assert_ne!(first.id, second.id);

    graph.add_annotation(MemberRef::Class(p), first);
    graph.add_annotation(MemberRef::Class(p), second);
    assert_eq!(graph.annotations(MemberRef::Class(p)).len(), 2);
    assert!(graph.is_annotation_definition(marker));
    assert!(graph.is_interface(marker));
}

#[test]
fn annotatable_nodes_order() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let f = graph.add_field(p, FieldNode::new(graph.intern("f"), Modifiers::PRIVATE, ClassId::INT));
    let m = graph.add_method(p, method(&graph, "m", &[]));
    let c = graph.add_constructor(p, ConstructorNode::new(Modifiers::PUBLIC, Vec::new()));
    assert_eq!(
        graph.annotatable_nodes(p),
        vec![
            MemberRef::Class(p),
            MemberRef::Method(m),
            MemberRef::Field(f),
            MemberRef::Constructor(c),
        ]
    );
}

// === Lazy population ===

fn counting_loader(graph: &mut ClassGraph) -> (ClassId, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let run = graph.intern("run");
    graph.set_loader(Arc::new(move |_: &ClassGraph, _: ClassId| {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut members = ClassMembers::default();
        members
            .methods
            .push(MethodNode::new(run, Modifiers::PUBLIC, ClassId::VOID, Vec::new()));
        members
    }));
    let lib = graph.class("com.example.Lib").reflected("com.example.Lib").declare();
    (lib, calls)
}

#[test]
fn reflected_members_load_on_first_access() {
    let mut graph = ClassGraph::new();
    let (lib, calls) = counting_loader(&mut graph);
    assert!(!graph.is_initialized(lib));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(graph.methods(lib).len(), 1);
    assert!(graph.is_initialized(lib));
    assert_eq!(graph.methods(lib).len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_access_loads_once() {
    let mut graph = ClassGraph::new();
    let (lib, calls) = counting_loader(&mut graph);
    let graph = &graph;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(move || graph.methods(lib).len())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap_or(0), 1);
        }
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn primary_classes_are_initialized_eagerly() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    assert!(graph.is_initialized(p));
    graph.lazy_init(p);
}

#[test]
#[should_panic(expected = "lazy initialization requested for the redirected node")]
fn lazy_init_of_a_proxy_is_internal_error() {
    let mut graph = ClassGraph::new();
    let p = graph.class("P").declare();
    let proxy = graph.plain_node_reference(p);
    graph.lazy_init(proxy);
}
