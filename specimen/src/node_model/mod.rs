//! Node model: the tree of addressable positions in a described type
//!
//! Nodes live in an arena ([`NodeTree`]) and are addressed by [`NodeId`]. Self-referential types
//! produce terminal back-reference nodes holding the id of the ancestor they repeat, so the tree
//! is finite and every node has exactly one owner.

mod builder;
mod builders;
mod node;
mod path_kind;
mod recursion_context;
mod type_kind;

#[cfg(test)]
mod tests;

pub use builder::NodeTreeBuilder;
pub use node::Node;
pub use node::NodeId;
pub use node::NodeTree;
pub use path_kind::PathKind;
pub use recursion_context::RecursionDepth;
pub use type_kind::TypeKind;
