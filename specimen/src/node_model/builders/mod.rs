//! One child collector per container kind
//!
//! Each builder answers a single question: which member types does a node of this kind own?
//! Recursion, cycle detection and the depth cap live in [`NodeTreeBuilder`](super::NodeTreeBuilder).

mod array_builder;
mod list_builder;
mod map_builder;
mod set_builder;
mod struct_builder;
mod value_builder;

pub use array_builder::ArrayNodeBuilder;
pub use list_builder::ListNodeBuilder;
pub use map_builder::MapNodeBuilder;
pub use set_builder::SetNodeBuilder;
pub use struct_builder::StructNodeBuilder;
pub use value_builder::ValueNodeBuilder;

use super::recursion_context::ChildSpec;
use super::recursion_context::RecursionContext;
use crate::error::Result;

/// Collects the children of one kind of node
pub trait NodeKindBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>>;
}
