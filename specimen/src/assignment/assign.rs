//! Assignment declarations: values at one node derived from the value at another
//!
//! ```ignore
//! Assign::value_of(Selector::field("a"))
//!     .to(Selector::field("b"))
//!     .as_fn(|a, _| json!(a.as_i64().unwrap_or(0) + 1));
//!
//! Assign::given(Selector::field("status"), Selector::field("closed_at"))
//!     .when_equals(json!("Open"), Value::Null)
//!     .else_set(json!("2024-01-01"));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::generation::Generator;
use crate::generation::Random;
use crate::selector::GeneratorSpec;
use crate::selector::Selector;
use crate::selector::SelectorGroup;

/// Transforms the origin value into the destination value
pub type MapFn = Arc<dyn Fn(&JsonValue, &mut Random) -> JsonValue + Send + Sync>;

/// Condition over the origin value
pub type ValuePredicate = Arc<dyn Fn(&JsonValue) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Branch {
    pub(crate) predicate: ValuePredicate,
    pub(crate) source:    GeneratorSpec,
}

#[derive(Clone)]
pub(crate) enum AssignAction {
    /// Destination receives the origin value unchanged
    Copy,
    Map(MapFn),
    /// First branch whose predicate holds supplies the value
    Conditional {
        branches:  Vec<Branch>,
        otherwise: Option<GeneratorSpec>,
    },
}

/// One declared assignment from an origin selector to a destination selector
#[derive(Clone)]
pub struct Assignment {
    pub(crate) origin:      Selector,
    pub(crate) destination: SelectorGroup,
    pub(crate) action:      AssignAction,
}

impl Assignment {
    /// Replace the copy with a transform of the origin value
    #[must_use]
    pub fn as_fn(
        mut self,
        map: impl Fn(&JsonValue, &mut Random) -> JsonValue + Send + Sync + 'static,
    ) -> Self {
        self.action = AssignAction::Map(Arc::new(map));
        self
    }

    /// Selector whose value is read
    pub const fn origin(&self) -> &Selector { &self.origin }

    /// Selectors whose nodes receive the value
    pub const fn destination(&self) -> &SelectorGroup { &self.destination }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            AssignAction::Copy => {
                write!(f, "value_of({}).to({})", self.origin, self.destination)
            }
            AssignAction::Map(_) => {
                write!(f, "value_of({}).to({}).as_fn(..)", self.origin, self.destination)
            }
            AssignAction::Conditional {
                branches,
                otherwise,
            } => {
                write!(
                    f,
                    "given({}, {}) with {} branch(es)",
                    self.origin,
                    self.destination,
                    branches.len()
                )?;
                if otherwise.is_some() {
                    write!(f, " and an else value")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Assignment({self})") }
}

/// Entry points for declaring assignments
pub struct Assign;

impl Assign {
    /// Start a copy or transform from the node matched by `origin`
    pub const fn value_of(origin: Selector) -> ValueOf { ValueOf { origin } }

    /// Start a conditional assignment from `origin` into `destination`
    pub fn given(origin: Selector, destination: impl Into<SelectorGroup>) -> Given {
        Given {
            origin,
            destination: destination.into(),
            branches: Vec::new(),
            otherwise: None,
        }
    }
}

/// Assignment with a chosen origin and no destination yet
pub struct ValueOf {
    origin: Selector,
}

impl ValueOf {
    /// Copy the origin value into every node matched by `destination`
    pub fn to(self, destination: impl Into<SelectorGroup>) -> Assignment {
        Assignment {
            origin:      self.origin,
            destination: destination.into(),
            action:      AssignAction::Copy,
        }
    }
}

/// Conditional assignment under construction
///
/// Branches are tried in declaration order. With no matching branch and no else value the
/// destination is generated as if the assignment did not exist.
pub struct Given {
    origin:      Selector,
    destination: SelectorGroup,
    branches:    Vec<Branch>,
    otherwise:   Option<GeneratorSpec>,
}

impl Given {
    /// Branch taken when `predicate` accepts the origin value
    #[must_use]
    pub fn set_when(
        mut self,
        predicate: impl Fn(&JsonValue) -> bool + Send + Sync + 'static,
        source: impl Into<GeneratorSpec>,
    ) -> Self {
        self.branches.push(Branch {
            predicate: Arc::new(predicate),
            source:    source.into(),
        });
        self
    }

    /// Branch taken when the origin value equals `expected`
    #[must_use]
    pub fn when_equals(self, expected: JsonValue, source: impl Into<GeneratorSpec>) -> Self {
        self.set_when(move |value| value == &expected, source)
    }

    /// Branch generating its value with `generator`
    #[must_use]
    pub fn generate_when(
        self,
        predicate: impl Fn(&JsonValue) -> bool + Send + Sync + 'static,
        generator: impl Generator + 'static,
    ) -> Self {
        self.set_when(predicate, GeneratorSpec::generator(generator))
    }

    /// Value used when no branch matches
    #[must_use]
    pub fn else_set(mut self, source: impl Into<GeneratorSpec>) -> Self {
        self.otherwise = Some(source.into());
        self
    }
}

impl From<Given> for Assignment {
    fn from(given: Given) -> Self {
        Self {
            origin:      given.origin,
            destination: given.destination,
            action:      AssignAction::Conditional {
                branches:  given.branches,
                otherwise: given.otherwise,
            },
        }
    }
}
