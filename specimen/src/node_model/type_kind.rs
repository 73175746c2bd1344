//! Category of a node for dispatch during building and generation

use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumString;

/// How a node is built and generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum TypeKind {
    /// Fixed-length array
    Array,
    /// Terminal node whose type already appears on the path from the root
    BackReference,
    /// Unit-variant enum
    Enum,
    /// List or deque
    List,
    /// Map
    Map,
    /// Terminal node cut off by the depth cap
    Opaque,
    /// Unordered set
    Set,
    /// Struct with named fields
    Struct,
    /// Primitive leaf
    Value,
}

impl TypeKind {
    /// Whether nodes of this kind have children
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Array | Self::List | Self::Map | Self::Set | Self::Struct
        )
    }

    /// Containers whose children repeat once per element
    pub const fn is_repeating(self) -> bool {
        matches!(self, Self::Array | Self::List | Self::Map | Self::Set)
    }

    /// Terminal nodes that are never expanded
    pub const fn is_terminal(self) -> bool { !self.is_container() }
}
