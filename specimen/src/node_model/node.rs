//! Arena of nodes built for one generation call

use std::fmt::Write as _;

use serde::Serialize;

use super::path_kind::PathKind;
use super::type_kind::TypeKind;
use crate::schema::TypeExpr;

/// Handle of a node inside its [`NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self { Self(index) }

    /// Position in the arena, in creation order
    pub const fn index(self) -> usize { self.0 }
}

/// One addressable position in the described structure
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id:             NodeId,
    pub(crate) parent:         Option<NodeId>,
    pub(crate) children:       Vec<NodeId>,
    pub(crate) depth:          usize,
    pub(crate) path_kind:      PathKind,
    pub(crate) type_kind:      TypeKind,
    pub(crate) ty:             TypeExpr,
    pub(crate) optional:       bool,
    pub(crate) display_path:   String,
    pub(crate) back_reference: Option<NodeId>,
}

impl Node {
    /// This node's handle
    pub const fn id(&self) -> NodeId { self.id }

    /// `None` for the root
    pub const fn parent(&self) -> Option<NodeId> { self.parent }

    /// Fields in declaration order; one element node; key then value for maps
    pub fn children(&self) -> &[NodeId] { &self.children }

    /// Distance from the root
    pub const fn depth(&self) -> usize { self.depth }

    /// Position within the parent
    pub const fn path_kind(&self) -> &PathKind { &self.path_kind }

    /// Dispatch category
    pub const fn type_kind(&self) -> TypeKind { self.type_kind }

    /// Target type with generic arguments substituted
    pub const fn ty(&self) -> &TypeExpr { &self.ty }

    /// Whether the position was declared as `Option<T>`
    pub const fn is_optional(&self) -> bool { self.optional }

    /// Path from the root, e.g. `Person.address.city`
    pub fn display_path(&self) -> &str { &self.display_path }

    /// Whether this is the tree's root
    pub const fn is_root(&self) -> bool { self.parent.is_none() }

    /// Field name when the node is a struct field
    pub fn field_name(&self) -> Option<&str> { self.path_kind.field_name() }

    /// Ancestor this back-reference points at
    pub const fn back_reference(&self) -> Option<NodeId> { self.back_reference }

    /// Whether this node repeats an ancestor's type
    pub const fn is_back_reference(&self) -> bool { self.back_reference.is_some() }
}

/// Immutable tree of nodes rooted at the requested type
#[derive(Debug, Clone)]
pub struct NodeTree {
    pub(crate) nodes: Vec<Node>,
}

impl NodeTree {
    /// The requested type's node
    pub fn root(&self) -> &Node { &self.nodes[0] }

    /// Node by id; ids come from this tree
    pub fn get(&self, id: NodeId) -> &Node { &self.nodes[id.0] }

    /// Number of nodes
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Whether there is nothing
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Nodes in creation order, which is depth-first
    pub fn nodes(&self) -> impl Iterator<Item = &Node> { self.nodes.iter() }

    /// Ancestors of a node, nearest first, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.get(id).parent.map(|parent| self.get(parent)), |node| {
            node.parent.map(|parent| self.get(parent))
        })
    }

    /// Whether `ancestor` lies on the path from the root to `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|node| node.id == ancestor)
    }

    /// Readable dump of the tree, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let indent = "  ".repeat(node.depth);
            let label = match &node.path_kind {
                PathKind::RootValue => node.display_path.clone(),
                other => other.segment(),
            };
            let _ = write!(out, "{indent}{label}: {} <{}", node.ty, node.type_kind);
            if node.optional {
                out.push_str(", optional");
            }
            if let Some(target) = node.back_reference {
                let _ = write!(out, ", back to {}", self.get(target).display_path);
            }
            let _ = writeln!(out, "> depth {}", node.depth);
        }
        out
    }
}
