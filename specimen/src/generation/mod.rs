//! Generation walker and everything it writes into
//!
//! The walker owns nothing long-lived: the [`Random`] source and the [`InstanceGraph`] belong to
//! the call and are lent to it, so nested models can share both.

mod ancestor_tracker;
pub mod generators;
mod instance_graph;
mod random;
mod value_store;
mod walker;

#[cfg(test)]
mod tests;

pub use ancestor_tracker::AncestorTracker;
pub(crate) use ancestor_tracker::AncestorSnapshot;
pub use generators::Generator;
pub use instance_graph::Instance;
pub use instance_graph::InstanceGraph;
pub use instance_graph::InstanceId;
pub(crate) use instance_graph::Slot;
pub use instance_graph::Value;
pub use random::Random;
pub(crate) use value_store::Iteration;
pub(crate) use walker::GenerationWalker;
pub(crate) use walker::WalkContext;
pub(crate) use walker::Walked;
