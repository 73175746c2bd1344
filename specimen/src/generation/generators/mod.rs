//! Leaf generators: the values at terminal nodes
//!
//! [`Generator`] is the extension point. Built-in primitive and enum producers live in
//! [`builtin`]; [`helpers`] has small generators for common overrides.

pub(crate) mod builtin;
mod helpers;

use serde_json::Value as JsonValue;

pub use helpers::FnGenerator;
pub use helpers::IntGenerator;
pub use helpers::OneOf;
pub use helpers::StringGenerator;
pub use helpers::from_fn;
pub use helpers::ints;
pub use helpers::one_of;
pub use helpers::strings;

use super::random::Random;
use crate::schema::TypeExpr;

/// Produces one leaf value per call
///
/// Errors are wrapped with the node path and depth by the walker. Return a
/// [`FatalGeneratorError`](crate::FatalGeneratorError) to abort even when failures are
/// otherwise suppressed.
pub trait Generator: Send + Sync {
    /// Next value; an error is reported against the node being generated
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue>;

    /// Whether this generator applies to `ty` when registered as a custom generator
    fn supports(&self, _ty: &TypeExpr) -> bool { true }
}
