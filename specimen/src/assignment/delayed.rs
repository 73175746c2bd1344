use crate::generation::AncestorSnapshot;
use crate::generation::Iteration;
use crate::generation::Slot;
use crate::node_model::NodeId;

/// A destination whose origin had no value yet when it was reached
///
/// The slot already holds a null placeholder. Retrying restores the container iteration and the
/// live ancestors so the retry sees the same context as the first attempt.
#[derive(Debug, Clone)]
pub(crate) struct DelayedNode {
    pub(crate) node:       NodeId,
    pub(crate) slot:       Slot,
    pub(crate) iteration:  Vec<Iteration>,
    pub(crate) ancestors:  AncestorSnapshot,
    /// Index of the assignment that blocked the node
    pub(crate) blocked_by: usize,
}
