use serde::Serialize;
use strum::Display;

/// The declaration family a selector was registered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    /// Nodes skipped entirely
    Ignore,
    /// Nodes allowed to be null
    Nullable,
    /// Nodes with a value source
    Generate,
    /// Nodes regenerated until a predicate accepts the value
    Filter,
    /// Nodes whose values may not repeat within a call
    Unique,
    /// Nodes observed once generation completes
    OnComplete,
    /// Assignment destinations
    Assign,
}

impl OverrideKind {
    /// Every kind, in the order diagnostics list them
    pub const ALL: [Self; 7] = [
        Self::Ignore,
        Self::Nullable,
        Self::Generate,
        Self::Filter,
        Self::Unique,
        Self::OnComplete,
        Self::Assign,
    ];

    /// Builder methods that declare selectors of this kind
    pub const fn method_names(self) -> &'static str {
        match self {
            Self::Ignore => "ignore()",
            Self::Nullable => "with_nullable()",
            Self::Generate => "set(), supply(), generate() or set_model()",
            Self::Filter => "filter()",
            Self::Unique => "with_unique()",
            Self::OnComplete => "on_complete()",
            Self::Assign => "assign()",
        }
    }
}
