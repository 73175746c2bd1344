//! Selectors: declarative matchers over node metadata
//!
//! A [`Selector`] combines one target criterion with optional scopes and an optional exact depth.
//! Scopes are listed outermost first and are satisfied by strict ancestors of the node, in order.

use std::fmt;
use std::sync::Arc;

use super::scope::FieldTarget;
use super::scope::Scope;
use super::scope::ScopeTarget;
use crate::error::Error;
use crate::error::Result;
use crate::node_model::Node;
use crate::node_model::NodeTree;
use crate::schema::Describe;
use crate::schema::Shape;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

/// Predicate over node metadata used by [`Selector::matching`]
pub type NodePredicate = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Target {
    Root,
    Type(TypeExpr),
    Field(FieldTarget),
    Predicate {
        description: String,
        predicate:   NodePredicate,
    },
}

/// Picks nodes by type, field, predicate or root, optionally narrowed by scopes and depth
#[derive(Clone)]
pub struct Selector {
    pub(crate) target: Target,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) depth:  Option<usize>,
}

impl Selector {
    const fn new(target: Target) -> Self {
        Self {
            target,
            scopes: Vec::new(),
            depth: None,
        }
    }

    /// The root node only
    pub const fn root() -> Self { Self::new(Target::Root) }

    /// Every node whose type matches `ty`; a bare generic name matches every instantiation
    pub const fn all(ty: TypeExpr) -> Self { Self::new(Target::Type(ty)) }

    /// Every node of type `T`
    pub fn of<T: Describe + ?Sized>() -> Self { Self::all(T::type_expr()) }

    /// Every field with this name, in any struct
    pub fn field(name: impl Into<String>) -> Self {
        Self::new(Target::Field(FieldTarget {
            declaring: None,
            name:      name.into(),
        }))
    }

    /// The field `name` declared by `declaring`
    pub fn field_in(declaring: TypeExpr, name: impl Into<String>) -> Self {
        Self::new(Target::Field(FieldTarget {
            declaring: Some(declaring),
            name:      name.into(),
        }))
    }

    /// The field `name` declared by `T`
    pub fn field_of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::field_in(T::type_expr(), name)
    }

    /// Nodes accepted by an arbitrary predicate
    pub fn matching(
        description: impl Into<String>,
        predicate: impl Fn(&Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(Target::Predicate {
            description: description.into(),
            predicate:   Arc::new(predicate),
        })
    }

    /// Add a scope; scopes are listed outermost first
    #[must_use]
    pub fn within(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Only match nodes at exactly this depth
    #[must_use]
    pub const fn at_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Turn a type or field selector into a scope
    pub fn to_scope(&self) -> Result<Scope> {
        let target = match &self.target {
            Target::Type(ty) => ScopeTarget::Type(ty.clone()),
            Target::Field(field) => ScopeTarget::Field(field.clone()),
            Target::Root | Target::Predicate { .. } => {
                return Err(Error::invalid("scope", format!("{self} cannot be used as a scope")).into());
            }
        };
        Ok(Scope {
            target,
            min_depth: self.depth,
        })
    }

    /// Whether `node` is selected, scopes and depth included
    pub fn matches(&self, tree: &NodeTree, node: &Node) -> bool {
        let target = match &self.target {
            Target::Root => node.is_root(),
            Target::Type(ty) => ty.matches(node.ty()),
            Target::Field(field) => field.matches(node),
            Target::Predicate { predicate, .. } => predicate(node),
        };
        target
            && self.depth.is_none_or(|depth| node.depth() == depth)
            && self.scopes_match(tree, node)
    }

    /// Walk up from the parent, consuming scopes from the innermost one
    fn scopes_match(&self, tree: &NodeTree, node: &Node) -> bool {
        let mut remaining = self.scopes.iter().rev().peekable();
        for ancestor in tree.ancestors(node.id()) {
            let Some(scope) = remaining.peek() else {
                break;
            };
            if scope.matches(ancestor) {
                remaining.next();
            }
        }
        remaining.peek().is_none()
    }

    /// Reject field selectors naming a registered type that has no such field
    pub(crate) fn validate(&self, registry: &TypeRegistry) -> Result<()> {
        let scope_fields = self.scopes.iter().filter_map(|scope| match &scope.target {
            ScopeTarget::Field(field) => Some(field),
            ScopeTarget::Type(_) => None,
        });
        let own_field = match &self.target {
            Target::Field(field) => Some(field),
            _ => None,
        };
        for field in own_field.into_iter().chain(scope_fields) {
            let Some(definition) = field
                .declaring
                .as_ref()
                .and_then(TypeExpr::type_name)
                .and_then(|name| registry.get(name))
            else {
                continue;
            };
            let known = match &definition.shape {
                Shape::Struct { .. } => definition.field(&field.name).is_some(),
                Shape::Enum { .. } => false,
            };
            if !known {
                return Err(Error::invalid(
                    "selector",
                    format!("{self}: type {} has no field named {}", definition.name, field.name),
                )
                .into());
            }
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Root => write!(f, "root()")?,
            Target::Type(ty) => write!(f, "all({ty})")?,
            Target::Field(field) => write!(f, "field({field})")?,
            Target::Predicate { description, .. } => write!(f, "matching({description})")?,
        }
        if let Some(depth) = self.depth {
            write!(f, ".at_depth({depth})")?;
        }
        if !self.scopes.is_empty() {
            write!(f, ".within(")?;
            for (index, scope) in self.scopes.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{scope}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Selector({self})") }
}

/// One or more selectors declared together
///
/// Every API that takes a selector accepts a group. Groups are flattened when declared, and each
/// member is tracked for usage on its own.
#[derive(Clone, Debug)]
pub struct SelectorGroup {
    pub(crate) selectors: Vec<Selector>,
}

impl SelectorGroup {
    /// A group matching every node matched by any member
    pub fn all_of(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            selectors: selectors.into_iter().collect(),
        }
    }

    /// Number of member selectors
    pub fn len(&self) -> usize { self.selectors.len() }

    /// Whether there is nothing
    pub fn is_empty(&self) -> bool { self.selectors.is_empty() }
}

impl From<Selector> for SelectorGroup {
    fn from(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }
}

impl<const N: usize> From<[Selector; N]> for SelectorGroup {
    fn from(selectors: [Selector; N]) -> Self { Self::all_of(selectors) }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selectors.as_slice() {
            [single] => write!(f, "{single}"),
            selectors => {
                write!(f, "all_of(")?;
                for (index, selector) in selectors.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{selector}")?;
                }
                write!(f, ")")
            }
        }
    }
}
