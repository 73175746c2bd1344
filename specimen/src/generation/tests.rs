#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, reason = "tests")]

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde_json::json;

use super::*;
use crate::Describe;
use crate::Specimen;
use crate::error::Error;
use crate::error::FatalGeneratorError;
use crate::generation::generators::from_fn;
use crate::generation::generators::one_of;
use crate::schema::TypeExpr;
use crate::selector::Scope;
use crate::selector::Selector;
use crate::settings::BackReferencePolicy;
use crate::settings::IntRange;
use crate::settings::Settings;
use crate::settings::SizeRange;

#[derive(Debug, Describe, Deserialize)]
struct Account {
    id:       i64,
    owner:    String,
    balance:  f64,
    tags:     Vec<String>,
    scores:   HashMap<String, i32>,
    nickname: Option<String>,
    status:   Status,
    slots:    [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Describe, Deserialize)]
enum Status {
    Open,
    Frozen,
    Closed,
}

#[derive(Debug, Describe, Deserialize)]
struct Chain {
    value: i32,
    next:  Option<Box<Chain>>,
}

#[derive(Debug, Describe, Deserialize)]
struct Flags {
    flags: HashSet<bool>,
}

#[derive(Debug, Describe, Deserialize)]
struct Tree {
    value:    i32,
    children: Vec<Tree>,
}

#[derive(Debug, Describe, Deserialize)]
struct Folder {
    name:    String,
    folders: HashMap<String, Folder>,
}

#[derive(Debug, Describe, Deserialize)]
struct Draw {
    numbers: Vec<i32>,
    bonus:   i32,
}

fn settings() -> Settings {
    Settings {
        seed: Some(7),
        collection_size: SizeRange::exactly(3),
        map_size: SizeRange::exactly(2),
        nullable_probability: 0.0,
        ..Settings::default()
    }
}

fn accounts() -> Specimen { Specimen::of::<Account>().with_settings(settings()) }

#[test]
fn test_default_generation_fills_every_kind() {
    let account: Account = accounts().create().unwrap();
    assert!((1..=10_000).contains(&account.id));
    assert!((1.0..=10_000.0).contains(&account.balance));
    assert!((3..=10).contains(&account.owner.len()));
    assert!(account.owner.chars().all(|c| c.is_ascii_uppercase()));
    assert_eq!(account.tags.len(), 3);
    assert_eq!(account.scores.len(), 2);
    assert!(account.nickname.is_some());
    assert_eq!(account.slots.len(), 3);
    assert!([Status::Open, Status::Frozen, Status::Closed].contains(&account.status));
}

#[test]
fn test_same_seed_reproduces_value() {
    let first = accounts().with_seed(99).create_json().unwrap();
    let second = accounts().with_seed(99).create_json().unwrap();
    assert_eq!(first, second);
    assert_ne!(first, accounts().with_seed(100).create_json().unwrap());
}

#[test]
fn test_ignored_field_is_absent() {
    let json = accounts()
        .ignore(Selector::field_of::<Account>("tags"))
        .create_json()
        .unwrap();
    assert!(json.get("tags").is_none());
    assert!(json.get("owner").is_some());
}

#[test]
fn test_set_and_supply_override_defaults() {
    let counter = Arc::new(AtomicI64::new(100));
    let supplied = Arc::clone(&counter);
    let account: Account = accounts()
        .set(Selector::field_of::<Account>("owner"), "Ada")
        .supply(Selector::field_of::<Account>("id"), move || {
            json!(supplied.fetch_add(1, Ordering::SeqCst))
        })
        .create()
        .unwrap();
    assert_eq!(account.owner, "Ada");
    assert_eq!(account.id, 100);
    assert_eq!(counter.load(Ordering::SeqCst), 101);
}

#[test]
fn test_last_declared_generator_wins() {
    let account: Account = accounts()
        .set(Selector::field_of::<Account>("owner"), "first")
        .set(Selector::field_of::<Account>("owner"), "second")
        .create()
        .unwrap();
    assert_eq!(account.owner, "second");
}

#[test]
fn test_nullable_positions_follow_probability() {
    let mut always_null = settings();
    always_null.nullable_probability = 1.0;
    let json = Specimen::of::<Account>()
        .with_settings(always_null)
        .with_nullable(Selector::field_of::<Account>("owner"))
        .create_json()
        .unwrap();
    assert_eq!(json["nickname"], json!(null));
    assert_eq!(json["owner"], json!(null));
    assert_ne!(json["id"], json!(null));
}

#[test]
fn test_back_reference_is_null_by_default() {
    let chain: Chain = Specimen::of::<Chain>()
        .with_settings(settings())
        .create()
        .unwrap();
    assert!(chain.next.is_none());
}

#[test]
fn test_back_reference_binds_to_ancestor_when_enabled() {
    let generated = Specimen::of::<Chain>()
        .with_settings(settings())
        .with_back_references(BackReferencePolicy::Ancestor)
        .create_graph()
        .unwrap();
    let root = generated.root().as_ref_id().unwrap();
    assert_eq!(generated.graph().field(root, "next"), Some(&Value::Ref(root)));
    // The cycle is cut when materializing
    assert_eq!(generated.to_json()["next"], json!(null));
}

#[test]
fn test_set_stops_after_repeated_duplicates() {
    let mut small = settings();
    small.collection_size = SizeRange::exactly(5);
    small.max_generation_attempts = 10;
    let flags: Flags = Specimen::of::<Flags>()
        .with_settings(small)
        .create()
        .unwrap();
    assert!(flags.flags.len() <= 2);
}

#[test]
fn test_custom_generator_applies_to_supported_types() {
    let mut one_key = settings();
    one_key.map_size = SizeRange::exactly(1);
    let account: Account = Specimen::of::<Account>()
        .with_settings(one_key)
        .register_generator(from_fn(|_| Ok(json!("fixed"))).for_type(TypeExpr::of::<String>()))
        .create()
        .unwrap();
    assert_eq!(account.owner, "fixed");
    assert!(account.tags.iter().all(|tag| tag == "fixed"));
    assert!(account.scores.contains_key("fixed"));
}

#[test]
fn test_selector_override_beats_custom_generator() {
    let mut one_key = settings();
    one_key.map_size = SizeRange::exactly(1);
    let account: Account = Specimen::of::<Account>()
        .with_settings(one_key)
        .register_generator(from_fn(|_| Ok(json!("fixed"))).for_type(TypeExpr::of::<String>()))
        .set(Selector::field_of::<Account>("owner"), "Ada")
        .create()
        .unwrap();
    assert_eq!(account.owner, "Ada");
    assert_eq!(account.nickname.as_deref(), Some("fixed"));
}

#[test]
fn test_generator_failure_aborts_by_default() {
    let error = accounts()
        .generate(
            Selector::field_of::<Account>("owner"),
            from_fn(|_| anyhow::bail!("directory offline")),
        )
        .create_json()
        .unwrap_err();
    let Error::GeneratorFailure(report) = error.current_context() else {
        panic!("expected a generator failure, got {error:?}");
    };
    assert_eq!(report.path, "Account.owner");
    assert_eq!(report.depth, 1);
    assert!(report.message.contains("directory offline"));
}

#[test]
fn test_generator_failure_becomes_null_when_not_failing_fast() {
    let mut tolerant = settings();
    tolerant.fail_on_error = false;
    let generated = Specimen::of::<Account>()
        .with_settings(tolerant)
        .generate(
            Selector::field_of::<Account>("owner"),
            from_fn(|_| anyhow::bail!("directory offline")),
        )
        .create_graph()
        .unwrap();
    assert_eq!(generated.to_json()["owner"], json!(null));
    assert_eq!(generated.suppressed_failures().len(), 1);
    assert_eq!(generated.suppressed_failures()[0].path, "Account.owner");
}

#[test]
fn test_fatal_generator_error_is_never_suppressed() {
    let mut tolerant = settings();
    tolerant.fail_on_error = false;
    let error = Specimen::of::<Account>()
        .with_settings(tolerant)
        .generate(
            Selector::field_of::<Account>("owner"),
            from_fn(|_| Err(FatalGeneratorError::new("credentials revoked").into())),
        )
        .create_json()
        .unwrap_err();
    assert!(matches!(error.current_context(), Error::GeneratorFailure(_)));
}

#[test]
fn test_callbacks_receive_generated_values_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let account: Account = accounts()
        .on_complete(
            Selector::of::<String>().within(Scope::field_of::<Account>("tags")),
            move |value| sink.lock().unwrap().push(value.clone()),
        )
        .create()
        .unwrap();
    let seen = seen.lock().unwrap();
    let tags: Vec<_> = account.tags.iter().map(|tag| json!(tag)).collect();
    assert_eq!(*seen, tags);
}

#[test]
fn test_callbacks_skip_null_values() {
    let mut always_null = settings();
    always_null.nullable_probability = 1.0;
    let calls = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&calls);
    Specimen::of::<Account>()
        .with_settings(always_null)
        .on_complete(Selector::field_of::<Account>("nickname"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .create_json()
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_one_of_generator_for_enum_field() {
    let account: Account = accounts()
        .generate(
            Selector::field_of::<Account>("status"),
            one_of([json!("Frozen")]),
        )
        .create()
        .unwrap();
    assert_eq!(account.status, Status::Frozen);
}

#[test]
fn test_depth_cap_leaves_deep_collections_empty() {
    let json = Specimen::of::<Account>()
        .with_settings(settings())
        .with_max_depth(1)
        .create_json()
        .unwrap();
    // Elements sit at depth 2 and are opaque; arrays keep their length
    assert_eq!(json["tags"], json!([]));
    assert_eq!(json["scores"], json!({}));
    assert_eq!(json["slots"], json!([null, null, null]));
    assert!(json["owner"].is_string());
}

#[test]
fn test_self_typed_list_elements_are_dropped_not_nulled() {
    let tree: Tree = Specimen::of::<Tree>()
        .with_settings(settings())
        .create()
        .unwrap();
    assert!(tree.children.is_empty());
}

#[test]
fn test_self_typed_map_values_drop_their_entries() {
    let folder: Folder = Specimen::of::<Folder>()
        .with_settings(settings())
        .create()
        .unwrap();
    assert!(folder.folders.is_empty());
    assert!(!folder.name.is_empty());
}

#[test]
fn test_nullable_elements_keep_their_nulls() {
    let mut always_null = settings();
    always_null.nullable_probability = 1.0;
    let json = accounts()
        .with_settings(always_null)
        .with_nullable(Selector::of::<String>().within(Scope::field_of::<Account>("tags")))
        .create_json()
        .unwrap();
    assert_eq!(json["tags"], json!([null, null, null]));
}

#[test]
fn test_duplicate_set_elements_do_not_fire_callbacks() {
    let mut five = settings();
    five.collection_size = SizeRange::exactly(5);
    let calls = Arc::new(AtomicI64::new(0));
    let counter = Arc::clone(&calls);
    let flags: Flags = Specimen::of::<Flags>()
        .with_settings(five)
        .on_complete(Selector::of::<bool>(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .create()
        .unwrap();
    let calls = calls.load(Ordering::SeqCst);
    assert!(calls <= 2);
    assert_eq!(calls, i64::try_from(flags.flags.len()).unwrap());
}

#[test]
fn test_filter_regenerates_until_accepted() {
    let accounts: Vec<Account> = accounts()
        .filter(Selector::field_of::<Account>("id"), |value| {
            value.as_i64().is_some_and(|id| id % 2 == 0)
        })
        .filter(Selector::of::<String>().within(Scope::field_of::<Account>("tags")), |value| {
            value.as_str().is_some_and(|tag| tag.starts_with('A'))
        })
        .create_many(10)
        .unwrap();
    for account in accounts {
        assert_eq!(account.id % 2, 0);
        assert!(account.tags.iter().all(|tag| tag.starts_with('A')));
        assert_eq!(account.tags.len(), 3);
    }
}

#[test]
fn test_filter_that_never_accepts_is_abandoned() {
    let mut few = settings();
    few.max_generation_attempts = 20;
    let error = accounts()
        .with_settings(few)
        .filter(Selector::field_of::<Account>("owner"), |_| false)
        .create_json()
        .unwrap_err();
    let Error::GenerationAbandoned { path, attempts, reason } = error.current_context() else {
        panic!("expected generation to be abandoned, got {error:?}");
    };
    assert_eq!(path, "Account.owner");
    assert_eq!(*attempts, 20);
    assert!(reason.starts_with("20 values rejected by filters"));
}

#[test]
fn test_unique_values_do_not_repeat_within_a_call() {
    let mut narrow = settings();
    narrow.collection_size = SizeRange::exactly(4);
    narrow.int_range = IntRange { min: 1, max: 5 };
    let draw: Draw = Specimen::of::<Draw>()
        .with_settings(narrow)
        .with_unique(Selector::of::<i32>().within(Scope::field_of::<Draw>("numbers")))
        .create()
        .unwrap();
    let distinct: HashSet<i32> = draw.numbers.iter().copied().collect();
    assert_eq!(draw.numbers.len(), 4);
    assert_eq!(distinct.len(), 4);
}

#[test]
fn test_unique_group_shares_one_pool() {
    let mut narrow = settings();
    narrow.collection_size = SizeRange::exactly(4);
    narrow.int_range = IntRange { min: 1, max: 5 };
    let draw: Draw = Specimen::of::<Draw>()
        .with_settings(narrow)
        .with_unique([
            Selector::of::<i32>().within(Scope::field_of::<Draw>("numbers")),
            Selector::field_of::<Draw>("bonus"),
        ])
        .create()
        .unwrap();
    assert!(!draw.numbers.contains(&draw.bonus));
    let distinct: HashSet<i32> = draw.numbers.iter().copied().collect();
    assert_eq!(distinct.len(), 4);
}

#[test]
fn test_unique_values_run_out() {
    let mut five = settings();
    five.collection_size = SizeRange::exactly(5);
    five.max_generation_attempts = 50;
    let error = Specimen::of::<Draw>()
        .with_settings(five)
        .with_unique(Selector::of::<i32>().within(Scope::field_of::<Draw>("numbers")))
        .generate(Selector::of::<i32>(), one_of([json!(1), json!(2)]))
        .create_json()
        .unwrap_err();
    let Error::GenerationAbandoned { reason, .. } = error.current_context() else {
        panic!("expected generation to be abandoned, got {error:?}");
    };
    assert!(reason.ends_with("50 values already generated"));
}
