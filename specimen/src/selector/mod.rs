//! Selector engine: which declared overrides apply to which nodes
//!
//! Declarations are collected per override kind in declaration order. [`resolve`] evaluates them
//! against a node tree once, before generation, so the walker only does lookups by [`NodeId`].
//!
//! [`NodeId`]: crate::node_model::NodeId

mod declarations;
mod override_kind;
mod resolver;
mod scope;
mod select;
mod selector_map;

#[cfg(test)]
mod tests;

pub use declarations::Declarations;
pub use declarations::GeneratorSpec;
pub use declarations::OnComplete;
pub use declarations::Supplier;
pub use override_kind::OverrideKind;
pub use resolver::NodeOverrides;
pub use resolver::ResolvedOverrides;
pub use resolver::match_unique;
pub use resolver::resolve;
pub use scope::Scope;
pub use select::NodePredicate;
pub use select::Selector;
pub use select::SelectorGroup;
pub use selector_map::SelectorId;
