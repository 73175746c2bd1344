//! Builder for set types (`HashSet`, `BTreeSet`)

use super::super::path_kind::PathKind;
use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::schema::TypeExpr;

pub struct SetNodeBuilder;

impl NodeKindBuilder for SetNodeBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        let TypeExpr::Set(element) = &ctx.ty else {
            return Err(Error::InvalidState(format!(
                "SetNodeBuilder called for non-set type {} at {}",
                ctx.ty, ctx.display_path
            ))
            .into());
        };
        Ok(vec![ChildSpec::new(
            PathKind::CollectionElement,
            element.as_ref().clone(),
        )])
    }
}
