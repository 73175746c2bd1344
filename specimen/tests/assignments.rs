//! Integration tests for `assignments`.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, reason = "tests")]

use serde::Deserialize;
use serde_json::json;
use specimen::Assign;
use specimen::Describe;
use specimen::Error;
use specimen::Selector;
use specimen::Settings;
use specimen::SizeRange;
use specimen::Specimen;

#[derive(Debug, Describe, Deserialize)]
struct Pair {
    a: i32,
    b: i32,
}

#[derive(Debug, Describe, Deserialize)]
struct Outer {
    left:  Point,
    right: Point,
    label: String,
}

#[derive(Debug, Describe, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

/// Fields in reverse dependency order so every step is delayed
#[derive(Debug, Describe, Deserialize)]
struct Ladder {
    f: i64,
    e: i64,
    d: i64,
    c: i64,
    b: i64,
    a: i64,
}

#[derive(Debug, Describe, Deserialize)]
struct Shipment {
    country:  String,
    currency: String,
}

#[derive(Debug, Describe, Deserialize)]
struct Invoice {
    lines: Vec<Line>,
}

#[derive(Debug, Describe, Deserialize)]
struct Line {
    quantity: i32,
    reserved: i32,
}

fn plus_one(value: &serde_json::Value) -> serde_json::Value { json!(value.as_i64().unwrap() + 1) }

#[test]
fn test_mapped_assignment_from_fixed_origin() {
    let pair: Pair = Specimen::of::<Pair>()
        .set(Selector::field_of::<Pair>("a"), 5)
        .assign(
            Assign::value_of(Selector::field_of::<Pair>("a"))
                .to(Selector::field_of::<Pair>("b"))
                .as_fn(|value, _| plus_one(value)),
        )
        .with_seed(1)
        .create()
        .unwrap();
    assert_eq!(pair.a, 5);
    assert_eq!(pair.b, 6);
}

#[test]
fn test_destination_before_origin_is_delayed_then_resolved() {
    let pair: Pair = Specimen::of::<Pair>()
        .set(Selector::field_of::<Pair>("b"), 41)
        .assign(
            Assign::value_of(Selector::field_of::<Pair>("b"))
                .to(Selector::field_of::<Pair>("a"))
                .as_fn(|value, _| plus_one(value)),
        )
        .with_seed(1)
        .create()
        .unwrap();
    assert_eq!(pair.a, 42);
}

#[test]
fn test_assignment_cycle_is_unresolved() {
    let error = Specimen::of::<Pair>()
        .assign(Assign::value_of(Selector::field_of::<Pair>("a")).to(Selector::field_of::<Pair>("b")))
        .assign(Assign::value_of(Selector::field_of::<Pair>("b")).to(Selector::field_of::<Pair>("a")))
        .with_seed(1)
        .create_json()
        .unwrap_err();
    let Error::UnresolvedAssignment(report) = error.current_context() else {
        panic!("expected an unresolved assignment, got {error:?}");
    };
    assert_eq!(report.assignments.len(), 2);
    let mut paths: Vec<_> = report.nodes.iter().map(|node| node.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["Pair.a", "Pair.b"]);
}

#[test]
fn test_ignored_origin_leaves_destination_unresolved() {
    let error = Specimen::of::<Pair>()
        .ignore(Selector::field_of::<Pair>("a"))
        .assign(Assign::value_of(Selector::field_of::<Pair>("a")).to(Selector::field_of::<Pair>("b")))
        .with_seed(1)
        .create_json()
        .unwrap_err();
    assert!(matches!(error.current_context(), Error::UnresolvedAssignment(_)));
}

#[test]
fn test_ambiguous_origin_names_both_matches() {
    let error = Specimen::of::<Outer>()
        .assign(Assign::value_of(Selector::field("x")).to(Selector::field_of::<Outer>("label")))
        .with_seed(1)
        .create_json()
        .unwrap_err();
    let Error::AmbiguousSelector(report) = error.current_context() else {
        panic!("expected an ambiguous selector, got {error:?}");
    };
    assert_eq!(report.selector, "field(x)");
    assert_eq!(report.first.path, "Outer.left.x");
    assert_eq!(report.second.path, "Outer.right.x");
}

#[test]
fn test_deep_assignment_chain_resolves() {
    let field = |name: &str| Selector::field_of::<Ladder>(name);
    let mut builder = Specimen::of::<Ladder>().set(field("a"), 1);
    for (origin, destination) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "f")] {
        builder = builder.assign(
            Assign::value_of(field(origin))
                .to(field(destination))
                .as_fn(|value, _| plus_one(value)),
        );
    }
    let ladder: Ladder = builder.with_seed(1).create().unwrap();
    assert_eq!(
        [ladder.a, ladder.b, ladder.c, ladder.d, ladder.e, ladder.f],
        [1, 2, 3, 4, 5, 6]
    );
}

#[test]
fn test_conditional_assignment_takes_first_true_branch() {
    let country = || Selector::field_of::<Shipment>("country");
    let currency = || Selector::field_of::<Shipment>("currency");

    let shipment: Shipment = Specimen::of::<Shipment>()
        .set(country(), "FR")
        .assign(
            Assign::given(country(), currency())
                .when_equals(json!("US"), json!("USD"))
                .when_equals(json!("FR"), json!("EUR"))
                .set_when(|_| true, json!("ANY"))
                .else_set(json!("XXX")),
        )
        .with_seed(1)
        .create()
        .unwrap();
    assert_eq!(shipment.currency, "EUR");

    let fallback: Shipment = Specimen::of::<Shipment>()
        .set(country(), "JP")
        .assign(
            Assign::given(country(), currency())
                .when_equals(json!("US"), json!("USD"))
                .else_set(json!("XXX")),
        )
        .with_seed(1)
        .create()
        .unwrap();
    assert_eq!(fallback.currency, "XXX");
}

#[test]
fn test_conditional_without_match_generates_normally() {
    let shipment: Shipment = Specimen::of::<Shipment>()
        .set(Selector::field_of::<Shipment>("country"), "JP")
        .assign(
            Assign::given(
                Selector::field_of::<Shipment>("country"),
                Selector::field_of::<Shipment>("currency"),
            )
            .when_equals(json!("US"), json!("USD")),
        )
        .with_seed(1)
        .create()
        .unwrap();
    assert_ne!(shipment.currency, "USD");
    assert!(shipment.currency.chars().all(|c| c.is_ascii_uppercase()));
}

#[test]
fn test_assignment_inside_collection_uses_same_element() {
    let settings = Settings {
        collection_size: SizeRange::exactly(4),
        ..Settings::default()
    };
    let invoice: Invoice = Specimen::of::<Invoice>()
        .with_settings(settings)
        .assign(
            Assign::value_of(Selector::field_of::<Line>("quantity"))
                .to(Selector::field_of::<Line>("reserved")),
        )
        .with_seed(5)
        .create()
        .unwrap();
    assert_eq!(invoice.lines.len(), 4);
    assert!(invoice.lines.iter().all(|line| line.reserved == line.quantity));
}

#[test]
fn test_assignment_map_can_use_random() {
    let pair: Pair = Specimen::of::<Pair>()
        .assign(
            Assign::value_of(Selector::field_of::<Pair>("a"))
                .to(Selector::field_of::<Pair>("b"))
                .as_fn(|value, random| {
                    json!(value.as_i64().unwrap() + i64::try_from(random.int_range(1, 3)).unwrap())
                }),
        )
        .with_seed(9)
        .create()
        .unwrap();
    assert!((pair.a + 1..=pair.a + 3).contains(&pair.b));
}
