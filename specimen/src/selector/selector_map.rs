//! Declared selectors of one override kind, in declaration order

use super::override_kind::OverrideKind;
use super::select::Selector;
use super::select::SelectorGroup;
use crate::node_model::Node;
use crate::node_model::NodeTree;

/// Identity of one declared selector, unique across a declaration set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(u32);

/// Hands out [`SelectorId`]s in declaration order
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectorIds {
    next: u32,
}

impl SelectorIds {
    pub(crate) const fn next(&mut self) -> SelectorId {
        let id = SelectorId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone)]
pub(crate) struct SelectorEntry<V> {
    pub(crate) id:       SelectorId,
    pub(crate) selector: Selector,
    pub(crate) value:    V,
}

#[derive(Clone)]
pub(crate) struct SelectorMap<V> {
    kind:    OverrideKind,
    entries: Vec<SelectorEntry<V>>,
}

impl<V: Clone> SelectorMap<V> {
    pub(crate) const fn new(kind: OverrideKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub(crate) const fn kind(&self) -> OverrideKind { self.kind }

    /// Flatten the group and record each member with the same value
    pub(crate) fn insert(&mut self, ids: &mut SelectorIds, group: SelectorGroup, value: V) {
        for selector in group.selectors {
            self.entries.push(SelectorEntry {
                id: ids.next(),
                selector,
                value: value.clone(),
            });
        }
    }

    pub(crate) fn entries(&self) -> &[SelectorEntry<V>] { &self.entries }

    /// Entries matching `node`, earliest declaration first
    pub(crate) fn matching<'a, 'n>(
        &'a self,
        tree: &'n NodeTree,
        node: &'n Node,
    ) -> impl Iterator<Item = &'a SelectorEntry<V>> + use<'a, 'n, V> {
        self.entries
            .iter()
            .filter(move |entry| entry.selector.matches(tree, node))
    }
}
