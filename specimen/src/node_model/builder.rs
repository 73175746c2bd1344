//! Node tree construction
//!
//! `NodeTreeBuilder::build` is the single entry point. It recurses over member types using the
//! per-kind builders in [`builders`](super::builders) and enforces the two structural guards:
//!
//! 1. **Cycle guard**: a struct type that already occurs on the path from the root (compared
//!    after generic substitution) becomes a terminal `BackReference` node.
//! 2. **Depth cap**: a node deeper than `max_depth` becomes a terminal `Opaque` node.
use std::sync::Arc;

use tracing::debug;

use super::builders::ArrayNodeBuilder;
use super::builders::ListNodeBuilder;
use super::builders::MapNodeBuilder;
use super::builders::NodeKindBuilder;
use super::builders::SetNodeBuilder;
use super::builders::StructNodeBuilder;
use super::builders::ValueNodeBuilder;
use super::node::Node;
use super::node::NodeId;
use super::node::NodeTree;
use super::recursion_context::ChildSpec;
use super::recursion_context::RecursionContext;
use super::recursion_context::RecursionDepth;
use super::type_kind::TypeKind;
use crate::error::Error;
use crate::error::Result;
use crate::schema::Shape;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

/// Builds the immutable node tree for one root type
pub struct NodeTreeBuilder {
    registry:  Arc<TypeRegistry>,
    max_depth: usize,
    nodes:     Vec<Node>,
}

impl NodeTreeBuilder {
    /// Builder cutting the tree off below `max_depth`
    pub const fn new(registry: Arc<TypeRegistry>, max_depth: usize) -> Self {
        Self {
            registry,
            max_depth,
            nodes: Vec::new(),
        }
    }

    /// Build the tree, failing only for descriptors that cannot be built at all
    pub fn build(mut self, root: &TypeExpr) -> Result<NodeTree> {
        if let Some(param) = root.first_param() {
            return Err(Error::unbuildable(root, format!("unbound type parameter {param}")).into());
        }
        let ctx = RecursionContext::new_root(root.clone(), Arc::clone(&self.registry));
        self.build_node(ctx, RecursionDepth::ZERO)?;
        debug!(root = %root, nodes = self.nodes.len(), "Built node tree");
        Ok(NodeTree { nodes: self.nodes })
    }

    fn build_node(&mut self, ctx: RecursionContext, depth: RecursionDepth) -> Result<NodeId> {
        let id = NodeId::new(self.nodes.len());

        let (type_kind, back_reference) = if depth.exceeds_limit(self.max_depth) {
            debug!(path = %ctx.display_path, depth = depth.get(), "Depth cap reached, node is opaque");
            (TypeKind::Opaque, None)
        } else {
            let type_kind = classify(&ctx)?;
            match self.find_cycle(&ctx, type_kind) {
                Some(target) => {
                    debug!(path = %ctx.display_path, type_name = %ctx.ty, "Cycle detected, node is a back-reference");
                    (TypeKind::BackReference, Some(target))
                }
                None => (type_kind, None),
            }
        };

        let children = collect_children(type_kind, &ctx)?;

        self.nodes.push(Node {
            id,
            parent: ctx.parent,
            children: Vec::with_capacity(children.len()),
            depth: depth.get(),
            path_kind: ctx.path_kind.clone(),
            type_kind,
            ty: ctx.ty.clone(),
            optional: ctx.optional,
            display_path: ctx.display_path.clone(),
            back_reference,
        });

        for child in children {
            let child_ctx = ctx.create_child_context(id, child);
            let child_id = self.build_node(child_ctx, depth.increment())?;
            self.nodes[id.index()].children.push(child_id);
        }

        Ok(id)
    }

    /// Nearest ancestor struct node with the same resolved type
    fn find_cycle(&self, ctx: &RecursionContext, type_kind: TypeKind) -> Option<NodeId> {
        if type_kind != TypeKind::Struct {
            return None;
        }
        std::iter::successors(ctx.parent, |id| self.nodes[id.index()].parent).find(|id| {
            let ancestor = &self.nodes[id.index()];
            ancestor.type_kind == TypeKind::Struct && ancestor.ty == ctx.ty
        })
    }
}

/// Determine the kind of a node from its resolved type
fn classify(ctx: &RecursionContext) -> Result<TypeKind> {
    match &ctx.ty {
        TypeExpr::Primitive(_) => Ok(TypeKind::Value),
        TypeExpr::Named { .. } => match ctx.require_definition() {
            Some(definition) => Ok(match definition.shape {
                Shape::Struct { .. } => TypeKind::Struct,
                Shape::Enum { .. } => TypeKind::Enum,
            }),
            None => Err(Error::unbuildable(&ctx.ty, "type is not registered")
                .into()),
        },
        TypeExpr::List(_) => Ok(TypeKind::List),
        TypeExpr::Set(_) => Ok(TypeKind::Set),
        TypeExpr::Map(..) => Ok(TypeKind::Map),
        TypeExpr::Array(..) => Ok(TypeKind::Array),
        TypeExpr::Param(name) => {
            Err(Error::unbuildable(&ctx.ty, format!("unbound type parameter {name}")).into())
        }
        TypeExpr::Option(_) => Err(Error::InvalidState(format!(
            "Option wrapper survived flattening at {}",
            ctx.display_path
        ))
        .into()),
    }
}

/// Single dispatch point from a type kind to its child collector
fn collect_children(type_kind: TypeKind, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
    match type_kind {
        TypeKind::Struct => StructNodeBuilder.collect_children(ctx),
        TypeKind::List => ListNodeBuilder.collect_children(ctx),
        TypeKind::Set => SetNodeBuilder.collect_children(ctx),
        TypeKind::Map => MapNodeBuilder.collect_children(ctx),
        TypeKind::Array => ArrayNodeBuilder.collect_children(ctx),
        TypeKind::Value | TypeKind::Enum | TypeKind::BackReference | TypeKind::Opaque => {
            ValueNodeBuilder.collect_children(ctx)
        }
    }
}
