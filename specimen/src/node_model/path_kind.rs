//! Where a node sits relative to its parent

use serde::Serialize;
use strum::AsRefStr;
use strum::Display;

use crate::schema::TypeExpr;

/// Position of a node within its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "PascalCase")]
pub enum PathKind {
    /// The requested type itself
    RootValue,
    /// A named field of a struct
    StructField {
        /// Field name as serialized
        field_name:  String,
        /// Type declaring the field
        parent_type: TypeExpr,
    },
    /// The element of a list or set; one node stands for every generated element
    CollectionElement,
    /// The key of a map entry
    MapKey,
    /// The value of a map entry
    MapValue,
    /// The element of a fixed-length array
    ArrayElement,
}

impl PathKind {
    /// Field `field_name` declared by `parent_type`
    pub fn struct_field(field_name: impl Into<String>, parent_type: TypeExpr) -> Self {
        Self::StructField {
            field_name: field_name.into(),
            parent_type,
        }
    }

    /// Segment appended to the parent's display path
    pub fn segment(&self) -> String {
        match self {
            Self::RootValue => String::new(),
            Self::StructField { field_name, .. } => format!(".{field_name}"),
            Self::CollectionElement | Self::ArrayElement => "[]".to_string(),
            Self::MapKey => "<key>".to_string(),
            Self::MapValue => "<value>".to_string(),
        }
    }

    /// Name of a struct field position
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::StructField { field_name, .. } => Some(field_name),
            _ => None,
        }
    }

    /// Type declaring this field, for struct fields only
    pub const fn parent_type(&self) -> Option<&TypeExpr> {
        match self {
            Self::StructField { parent_type, .. } => Some(parent_type),
            _ => None,
        }
    }
}
