//! Builder for map types (`HashMap`, `BTreeMap`)
//!
//! Maps own two children: the key node first, then the value node. Entries are generated by
//! pairing one key subtree with one value subtree.

use super::super::path_kind::PathKind;
use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::schema::TypeExpr;

pub struct MapNodeBuilder;

impl NodeKindBuilder for MapNodeBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        let TypeExpr::Map(key, value) = &ctx.ty else {
            return Err(Error::InvalidState(format!(
                "MapNodeBuilder called for non-map type {} at {}",
                ctx.ty, ctx.display_path
            ))
            .into());
        };
        Ok(vec![
            ChildSpec::new(PathKind::MapKey, key.as_ref().clone()),
            ChildSpec::new(PathKind::MapValue, value.as_ref().clone()),
        ])
    }
}
