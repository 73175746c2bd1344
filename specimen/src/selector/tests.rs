#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, reason = "tests")]

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::error::Error;
use crate::node_model::Node;
use crate::node_model::NodeTree;
use crate::node_model::NodeTreeBuilder;
use crate::schema::FieldDef;
use crate::schema::Primitive;
use crate::schema::TypeDef;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

fn int() -> TypeExpr { TypeExpr::Primitive(Primitive::I32) }

fn string() -> TypeExpr { TypeExpr::Primitive(Primitive::String) }

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.insert(TypeDef::structure("Root", vec![
        FieldDef::new("left", TypeExpr::named("Pair")),
        FieldDef::new("right", TypeExpr::named("Pair")),
        FieldDef::new("name", string()),
        FieldDef::new("ints", TypeExpr::generic("Holder", vec![int()])),
        FieldDef::new("strings", TypeExpr::generic("Holder", vec![string()])),
    ]));
    registry.insert(TypeDef::structure("Pair", vec![
        FieldDef::new("x", int()),
        FieldDef::new("label", string()),
    ]));
    registry.insert(
        TypeDef::structure("Holder", vec![FieldDef::new("value", TypeExpr::param("T"))])
            .with_params(["T"]),
    );
    registry
}

fn tree() -> NodeTree {
    NodeTreeBuilder::new(Arc::new(registry()), 8)
        .build(&TypeExpr::named("Root"))
        .expect("tree should build")
}

fn paths<'a>(tree: &'a NodeTree, selector: &Selector) -> Vec<&'a str> {
    tree.nodes()
        .filter(|node| selector.matches(tree, node))
        .map(Node::display_path)
        .collect()
}

fn node<'a>(tree: &'a NodeTree, path: &str) -> &'a Node {
    tree.nodes()
        .find(|node| node.display_path() == path)
        .unwrap_or_else(|| panic!("no node at {path}"))
}

#[test]
fn test_type_field_root_and_depth_targets() {
    let tree = tree();
    assert_eq!(paths(&tree, &Selector::root()), vec!["Root"]);
    assert_eq!(paths(&tree, &Selector::field("x")), vec!["Root.left.x", "Root.right.x"]);
    assert_eq!(
        paths(&tree, &Selector::field_in(TypeExpr::named("Root"), "name")),
        vec!["Root.name"]
    );
    assert_eq!(
        paths(&tree, &Selector::all(int()).at_depth(2)),
        vec!["Root.left.x", "Root.right.x", "Root.ints.value"]
    );
    assert_eq!(
        paths(
            &tree,
            &Selector::matching("strings at depth 1", |node| {
                node.depth() == 1 && node.ty() == &TypeExpr::Primitive(Primitive::String)
            })
        ),
        vec!["Root.name"]
    );
}

#[test]
fn test_bare_generic_name_matches_every_instantiation() {
    let tree = tree();
    assert_eq!(
        paths(&tree, &Selector::all(TypeExpr::named("Holder"))),
        vec!["Root.ints", "Root.strings"]
    );
    assert_eq!(
        paths(&tree, &Selector::all(TypeExpr::generic("Holder", vec![string()]))),
        vec!["Root.strings"]
    );
}

#[test]
fn test_scopes_are_outermost_first() {
    let tree = tree();
    let scoped = Selector::field("x")
        .within(Scope::of_type(TypeExpr::named("Root")))
        .within(Scope::field("left"));
    assert_eq!(paths(&tree, &scoped), vec!["Root.left.x"]);

    let reversed = Selector::field("x")
        .within(Scope::field("left"))
        .within(Scope::of_type(TypeExpr::named("Root")));
    assert!(paths(&tree, &reversed).is_empty());
}

#[test]
fn test_scope_minimum_depth_and_strict_ancestry() {
    let tree = tree();
    let deep = Selector::field("x").within(Scope::of_type(TypeExpr::named("Pair")).at_min_depth(2));
    assert!(paths(&tree, &deep).is_empty());

    let shallow = Selector::field("x").within(Scope::of_type(TypeExpr::named("Pair")).at_min_depth(1));
    assert_eq!(paths(&tree, &shallow).len(), 2);

    // a node never satisfies its own scope
    let own = Selector::field("left").within(Scope::field("left"));
    assert!(paths(&tree, &own).is_empty());
}

#[test]
fn test_match_unique_stops_at_second_match() {
    let tree = tree();
    let error = match_unique(&tree, &Selector::field("x")).unwrap_err();
    let Error::AmbiguousSelector(report) = error.current_context() else {
        panic!("expected ambiguity, got {error:?}");
    };
    assert_eq!(report.selector, "field(x)");
    assert_eq!(report.first.path, "Root.left.x");
    assert_eq!(report.second.path, "Root.right.x");
    assert_eq!(report.first.ancestors, vec!["Root.left", "Root"]);

    let unique = Selector::field("x").within(Scope::field("right"));
    assert_eq!(
        match_unique(&tree, &unique).unwrap(),
        Some(node(&tree, "Root.right.x").id())
    );
    assert_eq!(match_unique(&tree, &Selector::field("missing")).unwrap(), None);
}

#[test]
fn test_last_declared_generator_wins() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.generator(Selector::field("x").into(), json!(1).into());
    declarations.generator(Selector::all(int()).into(), json!(2).into());

    let resolved = resolve(&tree, &declarations);
    let left_x = node(&tree, "Root.left.x").id();
    match resolved.for_node(left_x).generator() {
        Some(GeneratorSpec::Value(value)) => assert_eq!(value, &json!(2)),
        other => panic!("unexpected generator {other:?}"),
    }
    assert!(resolved.unused_selectors().is_empty());
}

#[test]
fn test_callbacks_and_flags_accumulate() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.ignore(Selector::field("label").into());
    declarations.nullable(Selector::field("name").into());
    declarations.on_complete(Selector::field("x").into(), Arc::new(|_| {}));
    declarations.on_complete(Selector::all(int()).into(), Arc::new(|_| {}));

    let resolved = resolve(&tree, &declarations);
    assert!(resolved.for_node(node(&tree, "Root.left.label").id()).is_ignored());
    assert!(resolved.for_node(node(&tree, "Root.name").id()).is_nullable());
    assert_eq!(resolved.for_node(node(&tree, "Root.left.x").id()).callbacks.len(), 2);
    assert_eq!(resolved.for_node(node(&tree, "Root.ints.value").id()).callbacks.len(), 1);
}

#[test]
fn test_unused_selectors_are_reported_per_group_member() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.ignore(SelectorGroup::all_of([Selector::field("nope"), Selector::field("name")]));
    declarations.generator(Selector::all(TypeExpr::named("Ghost")).into(), json!(null).into());

    let resolved = resolve(&tree, &declarations);
    let unused = resolved.unused_selectors();
    assert_eq!(unused.of_kind(OverrideKind::Ignore).collect::<Vec<_>>(), vec!["field(nope)"]);
    assert_eq!(unused.of_kind(OverrideKind::Generate).collect::<Vec<_>>(), vec!["all(Ghost)"]);
}

#[test]
fn test_filters_and_unique_groups_reach_matching_nodes() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.filter(Selector::field("x").into(), Arc::new(|value| value.is_i64()));
    declarations.unique(SelectorGroup::all_of([Selector::field("name"), Selector::field("label")]));
    declarations.unique(Selector::field("ghost").into());

    let resolved = resolve(&tree, &declarations);
    let x = resolved.for_node(node(&tree, "Root.left.x").id());
    assert_eq!(x.filters.len(), 1);
    assert!(x.is_constrained());
    let name = resolved.for_node(node(&tree, "Root.name").id());
    let label = resolved.for_node(node(&tree, "Root.right.label").id());
    assert_eq!(name.unique, label.unique);
    assert!(!resolved.for_node(node(&tree, "Root.ints.value").id()).is_constrained());

    let unused = resolved.unused_selectors();
    assert_eq!(unused.of_kind(OverrideKind::Unique).collect::<Vec<_>>(), vec!["field(ghost)"]);
    assert_eq!(unused.of_kind(OverrideKind::Filter).count(), 0);
}

#[test]
fn test_shadowed_selectors_count_as_used() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.generator(Selector::field("name").into(), json!("first").into());
    declarations.generator(Selector::field("name").into(), json!("second").into());
    declarations.ignore(Selector::of::<Root>().into());
    declarations.nullable(Selector::field("x").into());

    let resolved = resolve(&tree, &declarations);
    assert!(resolved.unused_selectors().is_empty());
}

#[test]
fn test_resolution_is_repeatable() {
    let tree = tree();
    let mut declarations = Declarations::new();
    declarations.ignore(Selector::field("label").into());
    declarations.nullable(Selector::field("typo").into());

    let first = resolve(&tree, &declarations);
    let second = resolve(&tree, &declarations);
    assert_eq!(first.unused_selectors(), second.unused_selectors());
    for node in tree.nodes() {
        assert_eq!(
            first.for_node(node.id()).is_ignored(),
            second.for_node(node.id()).is_ignored()
        );
    }
}

#[test]
fn test_validate_rejects_unknown_field_of_registered_type() {
    let registry = registry();
    let unknown = Selector::field_in(TypeExpr::named("Pair"), "nope");
    let error = unknown.validate(&registry).unwrap_err();
    assert!(matches!(error.current_context(), Error::InvalidArgument(_)));

    assert!(Selector::field_in(TypeExpr::named("Pair"), "x").validate(&registry).is_ok());
    assert!(Selector::field_in(TypeExpr::named("Unregistered"), "x").validate(&registry).is_ok());
    assert!(Selector::field("anything").validate(&registry).is_ok());
}

#[test]
fn test_display_forms() {
    assert_eq!(Selector::root().to_string(), "root()");
    assert_eq!(Selector::all(string()).to_string(), "all(String)");
    assert_eq!(
        Selector::field_in(TypeExpr::named("Address"), "street")
            .within(Scope::field("home").at_min_depth(1))
            .at_depth(3)
            .to_string(),
        "field(Address.street).at_depth(3).within(scope(home, depth >= 1))"
    );
    assert_eq!(
        SelectorGroup::all_of([Selector::field("a"), Selector::field("b")]).to_string(),
        "all_of(field(a), field(b))"
    );
}

#[test]
fn test_to_scope_accepts_type_and_field_targets_only() {
    assert_eq!(
        Selector::field("left").to_scope().unwrap(),
        Scope::field("left")
    );
    assert!(Selector::root().to_scope().is_err());
}

struct Root;

impl crate::schema::Describe for Root {
    fn type_expr() -> TypeExpr { TypeExpr::named("Root") }
}
