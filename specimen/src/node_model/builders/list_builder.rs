//! Builder for list types (`Vec`, `VecDeque`)
//!
//! A single `CollectionElement` child stands for every element; the walker decides how many
//! elements to generate.

use super::super::path_kind::PathKind;
use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::schema::TypeExpr;

pub struct ListNodeBuilder;

impl NodeKindBuilder for ListNodeBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        let TypeExpr::List(element) = &ctx.ty else {
            return Err(Error::InvalidState(format!(
                "ListNodeBuilder called for non-list type {} at {}",
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
