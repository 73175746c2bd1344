use std::fmt;

use crate::node_model::Node;
use crate::node_model::PathKind;
use crate::schema::Describe;
use crate::schema::TypeExpr;

/// Field name with an optional declaring type
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldTarget {
    pub(crate) declaring: Option<TypeExpr>,
    pub(crate) name:      String,
}

impl FieldTarget {
    pub(crate) fn matches(&self, node: &Node) -> bool {
        let PathKind::StructField {
            field_name,
            parent_type,
        } = node.path_kind()
        else {
            return false;
        };
        field_name == &self.name
            && self
                .declaring
                .as_ref()
                .is_none_or(|declaring| declaring.matches(parent_type))
    }
}

impl fmt::Display for FieldTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaring {
            Some(declaring) => write!(f, "{declaring}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScopeTarget {
    Type(TypeExpr),
    Field(FieldTarget),
}

/// Restricts a selector to nodes that sit below a matching ancestor
///
/// A scope with a minimum depth only accepts ancestors at or below that depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub(crate) target:    ScopeTarget,
    pub(crate) min_depth: Option<usize>,
}

impl Scope {
    /// Ancestors whose type matches `ty`
    pub const fn of_type(ty: TypeExpr) -> Self {
        Self {
            target:    ScopeTarget::Type(ty),
            min_depth: None,
        }
    }

    /// Ancestors of type `T`
    pub fn of<T: Describe + ?Sized>() -> Self { Self::of_type(T::type_expr()) }

    /// Ancestors reached through a field with this name
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            target:    ScopeTarget::Field(FieldTarget {
                declaring: None,
                name:      name.into(),
            }),
            min_depth: None,
        }
    }

    /// Ancestors reached through `declaring.name`
    pub fn field_in(declaring: TypeExpr, name: impl Into<String>) -> Self {
        Self {
            target:    ScopeTarget::Field(FieldTarget {
                declaring: Some(declaring),
                name:      name.into(),
            }),
            min_depth: None,
        }
    }

    /// Ancestors reached through field `name` of `T`
    pub fn field_of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::field_in(T::type_expr(), name)
    }

    /// Only accept ancestors at `depth` or deeper
    #[must_use]
    pub const fn at_min_depth(mut self, depth: usize) -> Self {
        self.min_depth = Some(depth);
        self
    }

    pub(crate) fn matches(&self, node: &Node) -> bool {
        let target = match &self.target {
            ScopeTarget::Type(ty) => ty.matches(node.ty()),
            ScopeTarget::Field(field) => field.matches(node),
        };
        target && self.min_depth.is_none_or(|depth| node.depth() >= depth)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            ScopeTarget::Type(ty) => write!(f, "scope({ty}")?,
            ScopeTarget::Field(field) => write!(f, "scope({field}")?,
        }
        if let Some(depth) = self.min_depth {
            write!(f, ", depth >= {depth}")?;
        }
        write!(f, ")")
    }
}
