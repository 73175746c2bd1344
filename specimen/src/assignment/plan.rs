use std::collections::HashSet;

use tracing::debug;

use super::assign::Assignment;
use crate::error::Result;
use crate::node_model::NodeId;
use crate::node_model::NodeTree;
use crate::selector::match_unique;

/// Origin node of every assignment, resolved once per tree
///
/// An origin that matches nothing is kept as `None`; its destinations stay delayed and end up in
/// the unresolved-assignment report. An origin that matches more than one node is an error.
#[derive(Debug, Default)]
pub struct AssignmentPlan {
    origins:      Vec<Option<NodeId>>,
    origin_nodes: HashSet<NodeId>,
}

impl AssignmentPlan {
    /// Resolve every origin against `tree`
    pub fn new(tree: &NodeTree, assignments: &[Assignment]) -> Result<Self> {
        let origins = assignments
            .iter()
            .map(|assignment| {
                let origin = match_unique(tree, &assignment.origin)?;
                if origin.is_none() {
                    debug!(assignment = %assignment, "Assignment origin matches no node");
                }
                Ok(origin)
            })
            .collect::<Result<Vec<_>>>()?;
        let origin_nodes = origins.iter().flatten().copied().collect();
        Ok(Self {
            origins,
            origin_nodes,
        })
    }

    /// Origin node of the assignment at `index`
    pub fn origin(&self, index: usize) -> Option<NodeId> { self.origins.get(index).copied().flatten() }

    /// Whether values produced at `node` must be kept for a destination
    pub fn is_origin(&self, node: NodeId) -> bool { self.origin_nodes.contains(&node) }
}
