use thiserror::Error;

use crate::diagnostics::AmbiguousSelectorReport;
use crate::diagnostics::GeneratorFailureReport;
use crate::diagnostics::UnresolvedAssignmentReport;
use crate::diagnostics::UnusedSelectorReport;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";
const MSG_MISSING_PREFIX: &str = "Missing";

/// Result type for the `specimen` library
pub type Result<T> = core::result::Result<T, error_stack::Report<Error>>;

/// Errors raised by a generation call
#[derive(Error)]
pub enum Error {
    /// A descriptor that cannot be turned into a node tree
    #[error("Unbuildable type {type_name}: {reason}")]
    UnbuildableType {
        /// Display form of the offending type
        type_name: String,
        /// Why no tree could be built
        reason:    String,
    },

    /// An origin selector that should match one node matched several
    #[error("{0}")]
    AmbiguousSelector(Box<AmbiguousSelectorReport>),

    /// The delayed-node queue stopped draining
    #[error("{0}")]
    UnresolvedAssignment(Box<UnresolvedAssignmentReport>),

    /// Declared selectors that never matched a node
    #[error("{0}")]
    UnusedSelectors(Box<UnusedSelectorReport>),

    /// A leaf generator returned an error
    #[error("{0}")]
    GeneratorFailure(Box<GeneratorFailureReport>),

    /// No value satisfying a node's filters and uniqueness turned up within the attempt budget
    #[error("Generation abandoned at {path} after {attempts} attempts: {reason}")]
    GenerationAbandoned {
        /// Path of the node that kept being rejected
        path:     String,
        /// Attempts made before giving up
        attempts: usize,
        /// What the rejected values failed
        reason:   String,
    },

    /// Generated values could not be converted to the requested type
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Bad input to the builder, a selector or settings
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal inconsistency; always fatal
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnbuildableType { type_name, reason } => f
                .debug_struct("UnbuildableType")
                .field("type_name", type_name)
                .field("reason", reason)
                .finish(),
            Self::AmbiguousSelector(report) => {
                f.debug_tuple("AmbiguousSelector").field(report).finish()
            }
            Self::UnresolvedAssignment(report) => {
                f.debug_tuple("UnresolvedAssignment").field(report).finish()
            }
            Self::UnusedSelectors(report) => f.debug_tuple("UnusedSelectors").field(report).finish(),
            Self::GeneratorFailure(report) => {
                f.debug_tuple("GeneratorFailure").field(report).finish()
            }
            Self::GenerationAbandoned {
                path,
                attempts,
                reason,
            } => f
                .debug_struct("GenerationAbandoned")
                .field("path", path)
                .field("attempts", attempts)
                .field("reason", reason)
                .finish(),
            Self::Conversion(s) => f.debug_tuple("Conversion").field(s).finish(),
            Self::InvalidArgument(s) => f.debug_tuple("InvalidArgument").field(s).finish(),
            Self::InvalidState(s) => f.debug_tuple("InvalidState").field(s).finish(),
        }
    }
}

impl Error {
    /// Create an "Unbuildable type" error
    pub fn unbuildable(type_name: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::UnbuildableType {
            type_name: type_name.to_string(),
            reason:    reason.into(),
        }
    }

    /// Create a "Failed to X" error
    pub fn failed_to(action: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidState(format!("{MSG_FAILED_TO_PREFIX} {action}: {details}"))
    }

    /// Create an "Invalid X" error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create a "Missing X" error
    pub fn missing(what: &str) -> Self {
        Self::InvalidArgument(format!("{MSG_MISSING_PREFIX} {what}"))
    }

    /// Whether this error may be swallowed when `fail_on_error` is off
    pub const fn is_suppressible(&self) -> bool { matches!(self, Self::GeneratorFailure(_)) }
}

/// Marker for generator errors that must never be suppressed
///
/// Return `Err(FatalGeneratorError::new(..).into())` from a [`Generator`](crate::Generator) to
/// abort the call even when `fail_on_error` is disabled.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FatalGeneratorError(String);

impl FatalGeneratorError {
    /// Create a fatal generator error with a message
    pub fn new(message: impl Into<String>) -> Self { Self(message.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_prefix_messages() {
        assert_eq!(
            Error::invalid("size range", "min 5 > max 2").to_string(),
            "Invalid argument: Invalid size range: min 5 > max 2"
        );
        assert_eq!(
            Error::missing("root type").to_string(),
            "Invalid argument: Missing root type"
        );
        assert_eq!(
            Error::unbuildable("Pair<T>", "unbound type parameter T").to_string(),
            "Unbuildable type Pair<T>: unbound type parameter T"
        );
    }

    #[test]
    fn test_only_generator_failures_are_suppressible() {
        assert!(!Error::InvalidState("boom".to_string()).is_suppressible());
        assert!(!Error::unbuildable("X", "y").is_suppressible());
    }
}
