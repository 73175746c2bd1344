//! Context threaded through node tree construction
use std::sync::Arc;

use tracing::debug;

use super::node::NodeId;
use super::path_kind::PathKind;
use crate::schema::TypeDef;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

/// Distance from the root, checked against the configured maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RecursionDepth(usize);

impl RecursionDepth {
    /// The root's depth
    pub const ZERO: Self = Self(0);

    /// Depth of a child
    pub const fn increment(self) -> Self { Self(self.0 + 1) }

    /// Whether this depth is past `max_depth`
    pub const fn exceeds_limit(self, max_depth: usize) -> bool { self.0 > max_depth }

    /// Depth as a number
    pub const fn get(self) -> usize { self.0 }
}

/// A member type collected from a parent, before it becomes a node
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub path_kind: PathKind,
    pub ty:        TypeExpr,
}

impl ChildSpec {
    pub const fn new(path_kind: PathKind, ty: TypeExpr) -> Self { Self { path_kind, ty } }
}

/// Context for building one node
#[derive(Debug)]
pub struct RecursionContext {
    /// The position being built (root, field, element)
    pub path_kind:    PathKind,
    /// The node's type with `Option` wrappers removed and generics substituted
    pub ty:           TypeExpr,
    /// Set when one or more `Option` wrappers were removed
    pub optional:     bool,
    /// Reference to the type registry
    pub registry:     Arc<TypeRegistry>,
    /// The accumulated display path as we recurse through the type
    pub display_path: String,
    pub parent:       Option<NodeId>,
}

impl RecursionContext {
    pub fn new_root(ty: TypeExpr, registry: Arc<TypeRegistry>) -> Self {
        let (ty, optional) = unwrap_option(ty);
        Self {
            display_path: ty.to_string(),
            path_kind: PathKind::RootValue,
            ty,
            optional,
            registry,
            parent: None,
        }
    }

    /// Create a new context for a child (field, element, key or value)
    pub fn create_child_context(&self, parent: NodeId, child: ChildSpec) -> Self {
        let (ty, optional) = unwrap_option(child.ty);
        Self {
            display_path: format!("{}{}", self.display_path, child.path_kind.segment()),
            path_kind: child.path_kind,
            ty,
            optional,
            registry: Arc::clone(&self.registry),
            parent: Some(parent),
        }
    }

    /// Definition of the current named type, if registered
    pub fn require_definition(&self) -> Option<&TypeDef> {
        let name = self.ty.type_name()?;
        self.registry.get(name).or_else(|| {
            debug!(type_name = %name, path = %self.display_path, "Definition missing from registry");
            None
        })
    }
}

/// Strip nested `Option` wrappers, reporting whether any were present
fn unwrap_option(ty: TypeExpr) -> (TypeExpr, bool) {
    let mut ty = ty;
    let mut optional = false;
    while let TypeExpr::Option(inner) = ty {
        ty = *inner;
        optional = true;
    }
    (ty, optional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Primitive;

    #[test]
    fn test_child_context_flattens_options_and_extends_path() {
        let root = RecursionContext::new_root(TypeExpr::named("Person"), Arc::new(TypeRegistry::new()));
        assert_eq!(root.display_path, "Person");
        assert!(!root.optional);

        let child = root.create_child_context(
            NodeId::new(0),
            ChildSpec::new(
                PathKind::struct_field("nickname", TypeExpr::named("Person")),
                TypeExpr::option(TypeExpr::option(TypeExpr::Primitive(Primitive::String))),
            ),
        );
        assert_eq!(child.display_path, "Person.nickname");
        assert_eq!(child.ty, TypeExpr::Primitive(Primitive::String));
        assert!(child.optional);
    }

    #[test]
    fn test_recursion_depth_limit() {
        let depth = RecursionDepth::ZERO.increment().increment();
        assert_eq!(depth.get(), 2);
        assert!(!depth.exceeds_limit(2));
        assert!(depth.exceeds_limit(1));
    }
}
