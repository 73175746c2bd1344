//! Resolution of declared selectors against a node tree
//!
//! Resolution is a pure function of the tree and the declarations. Every selector that matches at
//! least one node is marked used, including selectors shadowed by a later declaration of the same
//! kind and selectors whose nodes are never generated because an ancestor is ignored.

use std::collections::HashSet;

use tracing::debug;

use super::declarations::Declarations;
use super::declarations::GeneratorSpec;
use super::declarations::OnComplete;
use super::select::Selector;
use super::selector_map::SelectorId;
use super::selector_map::SelectorMap;
use crate::assignment::ValuePredicate;
use crate::diagnostics::AmbiguousSelectorReport;
use crate::diagnostics::NodeReport;
use crate::diagnostics::UnusedSelector;
use crate::diagnostics::UnusedSelectorReport;
use crate::error::Error;
use crate::error::Result;
use crate::node_model::Node;
use crate::node_model::NodeId;
use crate::node_model::NodeTree;

/// Effective overrides for one node
#[derive(Clone, Default)]
pub struct NodeOverrides {
    pub(crate) ignored:     bool,
    pub(crate) nullable:    bool,
    /// Last declared matching generator
    pub(crate) generator:   Option<GeneratorSpec>,
    /// Every matching filter; all must accept a value
    pub(crate) filters:     Vec<ValuePredicate>,
    /// Unique declarations this node takes part in
    pub(crate) unique:      Vec<usize>,
    /// Every matching callback, in declaration order
    pub(crate) callbacks:   Vec<OnComplete>,
    /// Indices of assignments targeting this node, in declaration order
    pub(crate) assignments: Vec<usize>,
}

impl NodeOverrides {
    /// Whether an ignore selector matched
    pub const fn is_ignored(&self) -> bool { self.ignored }

    /// Whether a nullable selector matched
    pub const fn is_nullable(&self) -> bool { self.nullable }

    /// The winning value source, if any
    pub const fn generator(&self) -> Option<&GeneratorSpec> { self.generator.as_ref() }

    /// Whether generated values must pass filters or uniqueness checks
    pub fn is_constrained(&self) -> bool { !self.filters.is_empty() || !self.unique.is_empty() }
}

/// Overrides for every node of a tree, plus the selectors that matched nothing
pub struct ResolvedOverrides {
    nodes:  Vec<NodeOverrides>,
    used:   HashSet<SelectorId>,
    unused: UnusedSelectorReport,
}

impl ResolvedOverrides {
    /// Overrides for one node of the resolved tree
    pub fn for_node(&self, id: NodeId) -> &NodeOverrides { &self.nodes[id.index()] }

    /// Whether the selector matched at least one node
    pub fn is_used(&self, id: SelectorId) -> bool { self.used.contains(&id) }

    /// Selectors that matched no node
    pub const fn unused_selectors(&self) -> &UnusedSelectorReport { &self.unused }
}

/// Apply every declaration to every node
pub fn resolve(tree: &NodeTree, declarations: &Declarations) -> ResolvedOverrides {
    let mut used = HashSet::new();
    let mut nodes = Vec::with_capacity(tree.len());

    for node in tree.nodes() {
        let ignored = matched(&declarations.ignored, tree, node, &mut used);
        let nullable = matched(&declarations.nullable, tree, node, &mut used);
        let generators = matched(&declarations.generators, tree, node, &mut used);
        let filters = matched(&declarations.filters, tree, node, &mut used);
        let mut unique: Vec<usize> = matched(&declarations.unique, tree, node, &mut used)
            .into_iter()
            .copied()
            .collect();
        unique.dedup();
        let callbacks = matched(&declarations.callbacks, tree, node, &mut used);
        let assignments = matched(&declarations.destinations, tree, node, &mut used);

        nodes.push(NodeOverrides {
            ignored:     !ignored.is_empty(),
            nullable:    !nullable.is_empty(),
            generator:   generators.last().map(|spec| (*spec).clone()),
            filters:     filters.into_iter().cloned().collect(),
            unique,
            callbacks:   callbacks.into_iter().cloned().collect(),
            assignments: assignments.into_iter().copied().collect(),
        });
    }

    let unused = UnusedSelectorReport {
        selectors: declarations
            .declared()
            .filter(|(_, id, _)| !used.contains(id))
            .map(|(kind, _, selector)| UnusedSelector {
                kind,
                selector: selector.to_string(),
            })
            .collect(),
    };

    debug!(
        nodes = tree.len(),
        used = used.len(),
        unused = unused.selectors.len(),
        "Resolved selector overrides"
    );

    ResolvedOverrides {
        nodes,
        used,
        unused,
    }
}

/// Values of the entries matching `node`, marking each matched selector used
fn matched<'a, V: Clone>(
    map: &'a SelectorMap<V>,
    tree: &NodeTree,
    node: &Node,
    used: &mut HashSet<SelectorId>,
) -> Vec<&'a V> {
    map.matching(tree, node)
        .map(|entry| {
            used.insert(entry.id);
            &entry.value
        })
        .collect()
}

/// The single node matched by `selector`
///
/// Scans nodes in tree order and stops at the second match, reporting both.
pub fn match_unique(tree: &NodeTree, selector: &Selector) -> Result<Option<NodeId>> {
    let mut matches = tree.nodes().filter(|node| selector.matches(tree, node));
    let Some(first) = matches.next() else {
        return Ok(None);
    };
    match matches.next() {
        None => Ok(Some(first.id())),
        Some(second) => Err(Error::AmbiguousSelector(Box::new(AmbiguousSelectorReport {
            selector: selector.to_string(),
            first:    NodeReport::from_node(tree, first),
            second:   NodeReport::from_node(tree, second),
        }))
        .into()),
    }
}
