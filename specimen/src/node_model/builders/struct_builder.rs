//! Builder for structs with named fields
//!
//! Binds the definition's generic parameters to the node's type arguments, then substitutes
//! them into every field type so children always carry fully resolved types.

use std::collections::HashMap;

use super::super::path_kind::PathKind;
use super::super::recursion_context::ChildSpec;
use super::super::recursion_context::RecursionContext;
use super::NodeKindBuilder;
use crate::error::Error;
use crate::error::Result;
use crate::schema::Shape;
use crate::schema::TypeExpr;

pub struct StructNodeBuilder;

impl NodeKindBuilder for StructNodeBuilder {
    fn collect_children(&self, ctx: &RecursionContext) -> Result<Vec<ChildSpec>> {
        let TypeExpr::Named { args, .. } = &ctx.ty else {
            return Err(Error::InvalidState(format!(
                "StructNodeBuilder called for non-struct type {} at {}",
                ctx.ty, ctx.display_path
            ))
            .into());
        };
        let Some(definition) = ctx.require_definition() else {
            return Err(Error::unbuildable(&ctx.ty, "type is not registered").into());
        };
        let Shape::Struct { fields } = &definition.shape else {
            return Err(Error::unbuildable(&ctx.ty, "definition is not a struct").into());
        };

        if definition.params.len() != args.len() {
            return Err(Error::unbuildable(
                &ctx.ty,
                format!(
                    "expected {} type argument(s), found {}",
                    definition.params.len(),
                    args.len()
                ),
            )
            .into());
        }

        let bindings: HashMap<String, TypeExpr> = definition
            .params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();

        fields
            .iter()
            .map(|field| -> Result<ChildSpec> {
                let ty = field.ty.substitute(&bindings).map_err(|param| {
                    Error::unbuildable(
                        &ctx.ty,
                        format!("unbound type parameter {param} in field {}", field.name),
                    )
                })?;
                Ok(ChildSpec::new(
                    PathKind::struct_field(field.name.as_str(), ctx.ty.clone()),
                    ty,
                ))
            })
            .collect()
    }
}
