#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, reason = "tests")]

use std::sync::Arc;

use super::*;
use crate::error::Error;
use crate::schema::FieldDef;
use crate::schema::Primitive;
use crate::schema::TypeDef;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

fn string() -> TypeExpr { TypeExpr::Primitive(Primitive::String) }

fn int() -> TypeExpr { TypeExpr::Primitive(Primitive::I32) }

fn build(registry: TypeRegistry, root: &TypeExpr, max_depth: usize) -> NodeTree {
    NodeTreeBuilder::new(Arc::new(registry), max_depth)
        .build(root)
        .expect("tree should build")
}

fn find<'a>(tree: &'a NodeTree, path: &str) -> &'a Node {
    tree.nodes()
        .find(|node| node.display_path() == path)
        .unwrap_or_else(|| panic!("no node at {path}\n{}", tree.render()))
}

fn person_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.insert(TypeDef::structure("Person", vec![
        FieldDef::new("name", string()),
        FieldDef::new("age", TypeExpr::option(int())),
        FieldDef::new("address", TypeExpr::named("Address")),
        FieldDef::new("tags", TypeExpr::list(string())),
        FieldDef::new("scores", TypeExpr::map(string(), int())),
        FieldDef::new("status", TypeExpr::named("Status")),
    ]));
    registry.insert(TypeDef::structure("Address", vec![
        FieldDef::new("street", string()),
        FieldDef::new("lines", TypeExpr::array(string(), 2)),
    ]));
    registry.insert(TypeDef::enumeration("Status", ["Active", "Closed"]));
    registry
}

#[test]
fn test_builds_fields_containers_and_paths() {
    let tree = build(person_registry(), &TypeExpr::named("Person"), 8);

    let root = tree.root();
    assert!(root.is_root());
    assert_eq!(root.type_kind(), TypeKind::Struct);
    assert_eq!(root.children().len(), 6);

    let age = find(&tree, "Person.age");
    assert!(age.is_optional());
    assert_eq!(age.ty(), &int());
    assert_eq!(age.depth(), 1);

    let street = find(&tree, "Person.address.street");
    assert_eq!(street.depth(), 2);
    assert_eq!(street.field_name(), Some("street"));
    assert_eq!(
        street.path_kind().parent_type(),
        Some(&TypeExpr::named("Address"))
    );

    assert_eq!(find(&tree, "Person.tags[]").path_kind(), &PathKind::CollectionElement);
    assert_eq!(find(&tree, "Person.scores<key>").path_kind(), &PathKind::MapKey);
    assert_eq!(find(&tree, "Person.scores<value>").ty(), &int());
    assert_eq!(find(&tree, "Person.address.lines[]").path_kind(), &PathKind::ArrayElement);
    assert_eq!(find(&tree, "Person.status").type_kind(), TypeKind::Enum);
}

#[test]
fn test_depth_strictly_increases_from_parent_to_child() {
    let tree = build(person_registry(), &TypeExpr::named("Person"), 8);
    for node in tree.nodes() {
        for child in node.children() {
            assert_eq!(tree.get(*child).depth(), node.depth() + 1);
            assert_eq!(tree.get(*child).parent(), Some(node.id()));
        }
    }
}

#[test]
fn test_direct_self_reference_becomes_back_reference() {
    let mut registry = TypeRegistry::new();
    registry.insert(TypeDef::structure("Node", vec![
        FieldDef::new("value", int()),
        FieldDef::new("next", TypeExpr::option(TypeExpr::named("Node"))),
    ]));
    let tree = build(registry, &TypeExpr::named("Node"), 8);

    assert_eq!(tree.len(), 3);
    let next = find(&tree, "Node.next");
    assert_eq!(next.type_kind(), TypeKind::BackReference);
    assert_eq!(next.back_reference(), Some(tree.root().id()));
    assert!(next.children().is_empty());
}

#[test]
fn test_indirect_cycle_through_collection() {
    let mut registry = TypeRegistry::new();
    registry.insert(TypeDef::structure("Team", vec![FieldDef::new(
        "members",
        TypeExpr::list(TypeExpr::named("Member")),
    )]));
    registry.insert(TypeDef::structure("Member", vec![
        FieldDef::new("name", string()),
        FieldDef::new("team", TypeExpr::named("Team")),
    ]));
    let tree = build(registry, &TypeExpr::named("Team"), 8);

    let back = find(&tree, "Team.members[].team");
    assert_eq!(back.type_kind(), TypeKind::BackReference);
    assert_eq!(back.back_reference(), Some(tree.root().id()));
    assert!(tree.nodes().all(|node| node.depth() <= 3));
}

#[test]
fn test_generic_instantiations_are_distinct_node_types() {
    let mut registry = TypeRegistry::new();
    registry.insert(
        TypeDef::structure("Wrapper", vec![
            FieldDef::new("value", TypeExpr::param("T")),
            FieldDef::new(
                "other",
                TypeExpr::option(TypeExpr::generic("Wrapper", vec![string()])),
            ),
        ])
        .with_params(["T"]),
    );
    let tree = build(
        registry,
        &TypeExpr::generic("Wrapper", vec![int()]),
        8,
    );

    assert_eq!(find(&tree, "Wrapper<i32>.value").ty(), &int());
    let other = find(&tree, "Wrapper<i32>.other");
    assert_eq!(other.type_kind(), TypeKind::Struct);
    assert_eq!(find(&tree, "Wrapper<i32>.other.value").ty(), &string());
    let repeat = find(&tree, "Wrapper<i32>.other.other");
    assert_eq!(repeat.type_kind(), TypeKind::BackReference);
    assert_eq!(repeat.back_reference(), Some(other.id()));
}

#[test]
fn test_ever_growing_generic_is_cut_by_depth_cap() {
    let mut registry = TypeRegistry::new();
    registry.insert(
        TypeDef::structure("Nested", vec![
            FieldDef::new("value", TypeExpr::param("T")),
            FieldDef::new(
                "child",
                TypeExpr::generic("Nested", vec![TypeExpr::list(TypeExpr::param("T"))]),
            ),
        ])
        .with_params(["T"]),
    );
    let tree = build(registry, &TypeExpr::generic("Nested", vec![int()]), 4);

    assert!(tree.nodes().all(|node| node.depth() <= 5));
    assert!(tree.nodes().any(|node| node.type_kind() == TypeKind::Opaque));
    assert!(tree
        .nodes()
        .filter(|node| node.type_kind() == TypeKind::Opaque)
        .all(|node| node.children().is_empty() && node.depth() == 5));
}

#[test]
fn test_unbound_parameter_is_unbuildable() {
    let mut registry = TypeRegistry::new();
    registry.insert(
        TypeDef::structure("Holder", vec![FieldDef::new("value", TypeExpr::param("U"))])
            .with_params(["T"]),
    );
    let error = NodeTreeBuilder::new(Arc::new(registry), 8)
        .build(&TypeExpr::generic("Holder", vec![int()]))
        .unwrap_err();
    match error.current_context() {
        Error::UnbuildableType { reason, .. } => assert!(reason.contains("unbound type parameter U")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_root_parameter_and_arity_mismatch_are_unbuildable() {
    let mut registry = TypeRegistry::new();
    registry.insert(
        TypeDef::structure("Holder", vec![FieldDef::new("value", TypeExpr::param("T"))])
            .with_params(["T"]),
    );
    let registry = Arc::new(registry);

    let root_param = NodeTreeBuilder::new(Arc::clone(&registry), 8).build(&TypeExpr::param("T"));
    assert!(matches!(
        root_param.unwrap_err().current_context(),
        Error::UnbuildableType { .. }
    ));

    let missing_args = NodeTreeBuilder::new(registry, 8).build(&TypeExpr::named("Holder"));
    match missing_args.unwrap_err().current_context() {
        Error::UnbuildableType { reason, .. } => {
            assert_eq!(reason, "expected 1 type argument(s), found 0");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unregistered_type_is_unbuildable() {
    let result = NodeTreeBuilder::new(Arc::new(TypeRegistry::new()), 8)
        .build(&TypeExpr::list(TypeExpr::named("Ghost")));
    match result.unwrap_err().current_context() {
        Error::UnbuildableType { type_name, reason } => {
            assert_eq!(type_name, "Ghost");
            assert_eq!(reason, "type is not registered");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_ancestors_are_nearest_first() {
    let tree = build(person_registry(), &TypeExpr::named("Person"), 8);
    let street = find(&tree, "Person.address.street");
    let paths: Vec<_> = tree
        .ancestors(street.id())
        .map(Node::display_path)
        .collect();
    assert_eq!(paths, vec!["Person.address", "Person"]);
    assert!(tree.is_ancestor(tree.root().id(), street.id()));
}

#[test]
fn test_render_lists_every_node() {
    let tree = build(person_registry(), &TypeExpr::named("Person"), 8);
    let rendered = tree.render();
    assert_eq!(rendered.lines().count(), tree.len());
    assert!(rendered.starts_with("Person: Person <Struct> depth 0"));
    assert!(rendered.contains("  .age: i32 <Value, optional> depth 1"));
}
