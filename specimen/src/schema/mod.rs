//! Type descriptors: the input to the node model builder
//!
//! Descriptors come from `#[derive(Describe)]`, from hand-built [`TypeDef`]s, or from a JSON
//! schema document loaded with [`TypeRegistry::from_json_str`].

mod describe;
mod registry;
mod type_expr;
mod type_name;
mod type_parser;

pub use describe::Describe;
pub use registry::FieldDef;
pub use registry::Shape;
pub use registry::TypeDef;
pub use registry::TypeRegistry;
pub use type_expr::Primitive;
pub use type_expr::TypeExpr;
pub use type_name::TypeName;
