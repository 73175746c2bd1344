//! Builder for fixed-length arrays (`[T; N]`)

use super::super::path_kind::PathKind;
use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::schema::TypeExpr;

pub struct ArrayNodeBuilder;

impl NodeKindBuilder for ArrayNodeBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        let TypeExpr::Array(element, _) = &ctx.ty else {
            return Err(Error::InvalidState(format!(
                "ArrayNodeBuilder called for non-array type {} at {}",
                ctx.ty, ctx.display_path
            ))
            .into());
        };
        Ok(vec![ChildSpec::new(
            PathKind::ArrayElement,
            element.as_ref().clone(),
        )])
    }
}
