//! Test-data generation for arbitrary type graphs
//!
//! `specimen` turns a type descriptor into a populated value. Describe a type (usually with
//! `#[derive(Describe)]`), declare overrides against its positions with selectors, and create as
//! many values as needed, reproducibly for a fixed seed.
//!
//! # Pipeline
//!
//! 1. **Node model**: the descriptor becomes a finite tree of addressable positions. Recursive
//!    types end in back-reference nodes and a depth cap bounds everything else.
//! 2. **Selectors**: declarations (`ignore`, `set`, `generate`, `assign`, ...) are matched to
//!    nodes once. The last matching declaration of a kind wins.
//! 3. **Assignments**: values flow from an origin node to destination nodes. Destinations whose
//!    origin does not exist yet are delayed and retried until a pass makes no progress.
//! 4. **Walk**: a depth-first pass fills an instance graph from one seeded random source.
//!
//! # Example
//!
//! ```ignore
//! use specimen::{Assign, Describe, Selector, Specimen};
//!
//! #[derive(Describe, serde::Deserialize)]
//! struct Order {
//!     quantity: i32,
//!     reserved: i32,
//! }
//!
//! let order: Order = Specimen::of::<Order>()
//!     .set(Selector::field_of::<Order>("quantity"), 5)
//!     .assign(
//!         Assign::value_of(Selector::field_of::<Order>("quantity"))
//!             .to(Selector::field_of::<Order>("reserved"))
//!             .as_fn(|quantity, _| serde_json::json!(quantity.as_i64().unwrap_or(0) + 1)),
//!     )
//!     .with_seed(42)
//!     .create()?;
//! assert_eq!(order.reserved, 6);
//! ```
//!
//! # Errors
//!
//! Every fallible call returns [`Result`], an [`error_stack::Report`] over [`Error`]. Structural
//! problems (unbuildable types, ambiguous origins, unresolvable assignments) always abort.
//! Unused selectors abort unless the call is lenient. Generator failures abort unless
//! `fail_on_error` is off, in which case they become null and are listed in
//! [`Generated::suppressed_failures`].

// Lets the derive macro refer to `::specimen` from inside this crate's own tests
extern crate self as specimen;

mod assignment;
mod builder;
mod constants;
mod diagnostics;
mod engine;
mod error;
pub mod feed;
pub mod generation;
mod model;
pub mod node_model;
pub mod schema;
pub mod selector;
mod settings;
pub mod support;

pub use assignment::Assign;
pub use assignment::Assignment;
pub use assignment::Given;
pub use assignment::MapFn;
pub use assignment::ValueOf;
pub use assignment::ValuePredicate;
pub use builder::Generated;
pub use builder::Specimen;
pub use diagnostics::AmbiguousSelectorReport;
pub use diagnostics::GeneratorFailureReport;
pub use diagnostics::NodeReport;
pub use diagnostics::UnresolvedAssignmentReport;
pub use diagnostics::UnusedSelector;
pub use diagnostics::UnusedSelectorReport;
pub use error::Error;
pub use error::FatalGeneratorError;
pub use error::Result;
pub use generation::Generator;
pub use generation::Random;
pub use generation::generators;
pub use model::Model;
pub use schema::Describe;
pub use schema::TypeExpr;
pub use schema::TypeRegistry;
pub use selector::OverrideKind;
pub use selector::Scope;
pub use selector::Selector;
pub use selector::SelectorGroup;
pub use settings::BackReferencePolicy;
pub use settings::FloatRange;
pub use settings::IntRange;
pub use settings::Settings;
pub use settings::SizeRange;
/// Derive [`Describe`] for structs and unit-only enums
pub use specimen_macros::Describe;
