//! Assignment resolver: values derived from other generated values
//!
//! Declarations are built with [`Assign`]. Before generation, [`AssignmentPlan`] resolves each
//! origin selector to a single node. During generation the walker delays destinations whose
//! origin has not been produced yet and retries them until a pass makes no progress.

mod assign;
mod delayed;
mod plan;

pub use assign::Assign;
pub use assign::Assignment;
pub use assign::Given;
pub use assign::MapFn;
pub use assign::ValueOf;
pub use assign::ValuePredicate;
pub(crate) use assign::AssignAction;
pub(crate) use delayed::DelayedNode;
pub use plan::AssignmentPlan;
