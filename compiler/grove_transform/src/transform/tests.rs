use super::*;
use pretty_assertions::assert_eq;

use crate::test_helpers::Fixture;

#[test]
fn owner_is_the_class_holding_the_annotated_node() {
    let mut fx = Fixture::new();
    let marker = fx.graph.class("Marker").annotation().declare();
    let person = fx.class("Person");
    let age = fx.field(person, "age");
    let annotation = fx.graph.new_annotation(marker, grove_ir::Span::new(0, 6));

    let on_field = TransformTarget::Annotated {
        annotation: annotation.clone(),
        node: age,
    };
    let on_class = TransformTarget::Annotated {
        annotation,
        node: MemberRef::Class(person),
    };
    assert_eq!(on_field.owner(), Some(person));
    assert_eq!(on_class.owner(), Some(person));
    assert_eq!(TransformTarget::Unit.owner(), None);
}
