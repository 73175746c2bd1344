//! Values produced at assignment origins
//!
//! Values are keyed by the node and the container iteration they were produced in, so a
//! destination inside `people[3]` reads the origin from `people[3]` rather than the last person.

use std::collections::HashMap;

use crate::generation::instance_graph::Value;
use crate::node_model::NodeId;
use crate::node_model::NodeTree;

/// Container node and the index of the element being generated in it
pub(crate) type Iteration = (NodeId, usize);

#[derive(Debug, Default)]
pub(crate) struct ValueStore {
    scoped: HashMap<(NodeId, Vec<Iteration>), Value>,
    latest: HashMap<NodeId, Value>,
}

impl ValueStore {
    pub(crate) fn record(&mut self, node: NodeId, iteration: &[Iteration], value: Value) {
        self.scoped.insert((node, iteration.to_vec()), value.clone());
        self.latest.insert(node, value);
    }

    /// Value of `origin` as seen from a destination generated under `iteration`
    ///
    /// When every container above the origin is also above the destination the lookup is exact,
    /// and a miss means the origin has not been generated for this iteration yet. Otherwise the
    /// most recent value wins.
    pub(crate) fn lookup(&self, tree: &NodeTree, origin: NodeId, iteration: &[Iteration]) -> Option<&Value> {
        let containers = tree
            .ancestors(origin)
            .filter(|ancestor| ancestor.type_kind().is_repeating())
            .count();
        let shared: Vec<Iteration> = iteration
            .iter()
            .filter(|(container, _)| tree.is_ancestor(*container, origin))
            .copied()
            .collect();
        if shared.len() == containers {
            self.scoped.get(&(origin, shared))
        } else {
            self.latest.get(&origin)
        }
    }
}
