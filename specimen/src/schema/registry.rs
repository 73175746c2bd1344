//! Registry of struct and enum definitions referenced by [`TypeExpr::Named`]

use std::collections::HashMap;

use error_stack::Report;
use error_stack::ResultExt;
use serde::Deserialize;
use serde::Serialize;

use super::describe::Describe;
use super::type_expr::TypeExpr;
use super::type_name::TypeName;
use crate::error::Error;
use crate::error::Result;

/// One field of a struct definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// Field name as serialized
    pub name: String,
    /// Declared type, possibly mentioning the definition's parameters
    pub ty:   TypeExpr,
}

impl FieldDef {
    /// Field `name` of type `ty`
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Structural shape of a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Shape {
    /// Named fields, generated in declaration order
    Struct {
        /// Fields in declaration order
        fields: Vec<FieldDef>,
    },
    /// Unit variants, generated as their names
    Enum {
        /// Variant names as serialized
        variants: Vec<String>,
    },
}

/// A registered composite type, possibly generic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDef {
    /// Registered name
    pub name:   TypeName,
    /// Generic parameter names in declaration order
    pub params: Vec<String>,
    /// Fields or variants
    pub shape:  Shape,
}

impl TypeDef {
    /// Non-generic struct; add parameters with `with_params`
    pub fn structure(name: impl Into<TypeName>, fields: Vec<FieldDef>) -> Self {
        Self {
            name:   name.into(),
            params: Vec::new(),
            shape:  Shape::Struct { fields },
        }
    }

    /// Unit-only enum
    pub fn enumeration<S: Into<String>>(
        name: impl Into<TypeName>,
        variants: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name:   name.into(),
            params: Vec::new(),
            shape:  Shape::Enum {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Declare generic parameters; field types may refer to them with [`TypeExpr::Param`]
    #[must_use]
    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Field definition by name, `None` for enums and unknown fields
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        match &self.shape {
            Shape::Struct { fields } => fields.iter().find(|field| field.name == name),
            Shape::Enum { .. } => None,
        }
    }
}

/// Definitions as written in a schema file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    types: Vec<SchemaTypeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaTypeDef {
    name:     String,
    #[serde(default)]
    params:   Vec<String>,
    #[serde(default)]
    fields:   Vec<SchemaField>,
    variants: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    ty:   String,
}

/// All definitions available to one generation call
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    definitions: HashMap<TypeName, TypeDef>,
}

impl TypeRegistry {
    /// Empty registry
    pub fn new() -> Self { Self::default() }

    /// Registry holding `T` and everything reachable from it
    pub fn of<T: Describe + ?Sized>() -> Self {
        let mut registry = Self::new();
        registry.register::<T>();
        registry
    }

    /// Register `T` and every definition reachable from it
    pub fn register<T: Describe + ?Sized>(&mut self) { T::register(self); }

    /// Insert or replace a definition
    pub fn insert(&mut self, definition: TypeDef) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Definition registered under `name`
    pub fn get(&self, name: &TypeName) -> Option<&TypeDef> { self.definitions.get(name) }

    /// Whether `name` is registered
    pub fn contains(&self, name: &TypeName) -> bool { self.definitions.contains_key(name) }

    /// Number of definitions
    pub fn len(&self) -> usize { self.definitions.len() }

    /// Whether there is nothing
    pub fn is_empty(&self) -> bool { self.definitions.is_empty() }

    /// Merge another registry, keeping existing definitions on conflict
    pub fn extend(&mut self, other: &Self) {
        for (name, definition) in &other.definitions {
            self.definitions
                .entry(name.clone())
                .or_insert_with(|| definition.clone());
        }
    }

    /// Load definitions from a JSON schema document
    ///
    /// ```json
    /// { "types": [
    ///     { "name": "Pair", "params": ["T"], "fields": [
    ///         { "name": "left", "type": "T" },
    ///         { "name": "tags", "type": "Vec<String>" } ] },
    ///     { "name": "Status", "variants": ["Active", "Closed"] } ] }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(json).map_err(|e| {
            Report::new(Error::invalid("schema document", e)).attach("expected {\"types\": [...]}")
        })?;

        let mut registry = Self::new();
        for raw in file.types {
            let shape = match raw.variants {
                Some(variants) if raw.fields.is_empty() => Shape::Enum { variants },
                Some(_) => {
                    return Err(Error::invalid(
                        "schema type",
                        format!("{} declares both fields and variants", raw.name),
                    )
                    .into());
                }
                None => {
                    let fields = raw
                        .fields
                        .into_iter()
                        .map(|field| {
                            TypeExpr::parse_with_params(&field.ty, &raw.params)
                                .attach_with(|| format!("field {}.{}", raw.name, field.name))
                                .map(|ty| FieldDef::new(field.name, ty))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Shape::Struct { fields }
                }
            };
            registry.insert(TypeDef {
                name: TypeName::from(raw.name),
                params: raw.params,
                shape,
            });
        }
        Ok(registry)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use super::*;
    use crate::schema::Primitive;

    #[test]
    fn test_from_json_str_parses_fields_and_variants() {
        let registry = TypeRegistry::from_json_str(
            r#"{ "types": [
                { "name": "Pair", "params": ["T"], "fields": [
                    { "name": "left", "type": "T" },
                    { "name": "tags", "type": "Vec<String>" } ] },
                { "name": "Status", "variants": ["Active", "Closed"] } ] }"#,
        )
        .unwrap();

        let pair = registry.get(&TypeName::from("Pair")).unwrap();
        assert_eq!(pair.params, vec!["T".to_string()]);
        assert_eq!(pair.field("left").unwrap().ty, TypeExpr::param("T"));
        assert_eq!(
            pair.field("tags").unwrap().ty,
            TypeExpr::list(TypeExpr::Primitive(Primitive::String))
        );

        let status = registry.get(&TypeName::from("Status")).unwrap();
        assert_eq!(status.shape, Shape::Enum {
            variants: vec!["Active".to_string(), "Closed".to_string()],
        });
    }

    #[test]
    fn test_from_json_str_rejects_bad_field_type() {
        let result = TypeRegistry::from_json_str(
            r#"{ "types": [ { "name": "Broken", "fields": [ { "name": "x", "type": "Vec<" } ] } ] }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_extend_keeps_existing_definitions() {
        let mut first = TypeRegistry::new();
        first.insert(TypeDef::enumeration("Status", ["A"]));
        let mut second = TypeRegistry::new();
        second.insert(TypeDef::enumeration("Status", ["B"]));
        second.insert(TypeDef::enumeration("Kind", ["C"]));

        first.extend(&second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.get(&TypeName::from("Status")).unwrap().shape,
            Shape::Enum {
                variants: vec!["A".to_string()],
            }
        );
    }
}
