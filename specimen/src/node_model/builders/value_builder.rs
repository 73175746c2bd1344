//! Builder for leaves: primitives and unit-variant enums
//!
//! **Recursion**: NO - leaves are produced directly by a generator.

use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Result;

pub struct ValueNodeBuilder;

impl NodeKindBuilder for ValueNodeBuilder {
    fn collect_children(&self, _ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        Ok(Vec::new())
    }
}
