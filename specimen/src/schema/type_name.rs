//! A newtype wrapper for the names of registered composite types

use serde::Deserialize;
use serde::Serialize;

/// Name of a registered struct or enum definition
///
/// Names are compared exactly. Module paths are kept if the caller supplies them, but
/// [`short_name`](Self::short_name) strips them for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// The name as a string slice
    pub fn as_str(&self) -> &str { &self.0 }

    /// Last path segment: `shop::model::Order` returns `Order`
    pub fn short_name(&self) -> &str { self.0.rsplit("::").next().unwrap_or(&self.0) }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self { Self(s) }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}
