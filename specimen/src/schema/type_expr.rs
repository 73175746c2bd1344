//! Type expressions: the shape of a value at one position
//!
//! A `TypeExpr` is either fully resolved (no [`TypeExpr::Param`] anywhere) or a template inside a
//! generic [`TypeDef`](super::TypeDef) whose parameters are bound when a node is built.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use strum::AsRefStr;
use strum::Display;
use strum::EnumIter;
use strum::EnumString;

use super::describe::Describe;
use super::type_name::TypeName;
use super::type_parser;
use crate::error::Error;
use crate::error::Result;

/// Leaf value types with a built-in generator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString, EnumIter,
)]
pub enum Primitive {
    /// `bool`
    #[strum(to_string = "bool")]
    Bool,
    /// `char`, upper-case ASCII by default
    #[strum(to_string = "char")]
    Char,
    /// `i8`
    #[strum(to_string = "i8")]
    I8,
    /// `i16`
    #[strum(to_string = "i16")]
    I16,
    /// `i32`
    #[strum(to_string = "i32")]
    I32,
    /// `i64` and `isize`
    #[strum(to_string = "i64", serialize = "isize")]
    I64,
    /// `u8`
    #[strum(to_string = "u8")]
    U8,
    /// `u16`
    #[strum(to_string = "u16")]
    U16,
    /// `u32`
    #[strum(to_string = "u32")]
    U32,
    /// `u64` and `usize`
    #[strum(to_string = "u64", serialize = "usize")]
    U64,
    /// `f32`
    #[strum(to_string = "f32")]
    F32,
    /// `f64`
    #[strum(to_string = "f64")]
    F64,
    /// `String` and `&str`
    #[strum(to_string = "String", serialize = "str")]
    String,
}

impl Primitive {
    /// Inclusive bounds of an integer primitive, `None` for other kinds
    pub const fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::U8 => Some((0, u8::MAX as i128)),
            Self::U16 => Some((0, u16::MAX as i128)),
            Self::U32 => Some((0, u32::MAX as i128)),
            Self::U64 => Some((0, u64::MAX as i128)),
            Self::Bool | Self::Char | Self::F32 | Self::F64 | Self::String => None,
        }
    }
}

/// The type found at one position of a described structure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A leaf such as `i32` or `String`
    Primitive(Primitive),
    /// A registered struct or enum, with generic arguments in declaration order
    Named {
        /// Registered name
        name: TypeName,
        /// Concrete generic arguments
        args: Vec<Self>,
    },
    /// `Vec<T>` and friends
    List(Box<Self>),
    /// `HashSet<T>` and friends
    Set(Box<Self>),
    /// `HashMap<K, V>` and friends
    Map(Box<Self>, Box<Self>),
    /// `[T; N]`
    Array(Box<Self>, usize),
    /// `Option<T>`; flattened into a nullable position by the node builder
    Option(Box<Self>),
    /// A generic parameter of the enclosing definition
    Param(String),
}

impl TypeExpr {
    /// The expression describing `T`
    pub fn of<T: Describe + ?Sized>() -> Self { T::type_expr() }

    /// A non-generic registered type
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic registered type with concrete or template arguments
    pub fn generic(name: impl Into<TypeName>, args: Vec<Self>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// `Vec<element>`
    pub fn list(element: Self) -> Self { Self::List(Box::new(element)) }

    /// `HashSet<element>`
    pub fn set(element: Self) -> Self { Self::Set(Box::new(element)) }

    /// `HashMap<key, value>`
    pub fn map(key: Self, value: Self) -> Self { Self::Map(Box::new(key), Box::new(value)) }

    /// `[element; len]`
    pub fn array(element: Self, len: usize) -> Self { Self::Array(Box::new(element), len) }

    /// `Option<inner>`
    pub fn option(inner: Self) -> Self { Self::Option(Box::new(inner)) }

    /// Generic parameter of the enclosing definition
    pub fn param(name: impl Into<String>) -> Self { Self::Param(name.into()) }

    /// Parse a Rust-like type expression such as `HashMap<String, Vec<Order>>`
    pub fn parse(input: &str) -> Result<Self> { Self::parse_with_params(input, &[]) }

    /// Parse a type expression where the listed identifiers are generic parameters
    pub fn parse_with_params(input: &str, params: &[String]) -> Result<Self> {
        type_parser::parse_type_expr(input, params)
            .map_err(|reason| Error::invalid("type expression", reason).into())
    }

    /// Name of the registered definition, if this is a named type
    pub const fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// First unbound generic parameter in this expression, if any
    pub fn first_param(&self) -> Option<&str> {
        match self {
            Self::Param(name) => Some(name),
            Self::Primitive(_) => None,
            Self::Named { args, .. } => args.iter().find_map(Self::first_param),
            Self::List(inner) | Self::Set(inner) | Self::Array(inner, _) | Self::Option(inner) => {
                inner.first_param()
            }
            Self::Map(key, value) => key.first_param().or_else(|| value.first_param()),
        }
    }

    /// Replace generic parameters with their bindings
    ///
    /// Returns the name of the first parameter without a binding as the error.
    pub fn substitute(&self, bindings: &HashMap<String, Self>) -> core::result::Result<Self, String> {
        Ok(match self {
            Self::Param(name) => bindings.get(name).cloned().ok_or_else(|| name.clone())?,
            Self::Primitive(primitive) => Self::Primitive(*primitive),
            Self::Named { name, args } => Self::Named {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.substitute(bindings))
                    .collect::<core::result::Result<_, _>>()?,
            },
            Self::List(inner) => Self::list(inner.substitute(bindings)?),
            Self::Set(inner) => Self::set(inner.substitute(bindings)?),
            Self::Option(inner) => Self::option(inner.substitute(bindings)?),
            Self::Array(inner, len) => Self::array(inner.substitute(bindings)?, *len),
            Self::Map(key, value) => Self::map(key.substitute(bindings)?, value.substitute(bindings)?),
        })
    }

    /// Selector semantics: a bare generic name matches every instantiation of that type
    pub fn matches(&self, candidate: &Self) -> bool {
        match (self, candidate) {
            (
                Self::Named { name, args },
                Self::Named {
                    name: candidate_name,
                    ..
                },
            ) if args.is_empty() => name == candidate_name,
            _ => self == candidate,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Named { name, args } if args.is_empty() => write!(f, "{}", name.short_name()),
            Self::Named { name, args } => {
                write!(f, "{}<", name.short_name())?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            Self::List(inner) => write!(f, "Vec<{inner}>"),
            Self::Set(inner) => write!(f, "HashSet<{inner}>"),
            Self::Map(key, value) => write!(f, "HashMap<{key}, {value}>"),
            Self::Array(inner, len) => write!(f, "[{inner}; {len}]"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::Param(name) => write!(f, "{name}"),
        }
    }
}

impl From<Primitive> for TypeExpr {
    fn from(primitive: Primitive) -> Self { Self::Primitive(primitive) }
}

impl TryFrom<String> for TypeExpr {
    type Error = String;

    fn try_from(value: String) -> core::result::Result<Self, Self::Error> {
        type_parser::parse_type_expr(&value, &[])
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self { value.to_string() }
}

impl Serialize for TypeExpr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeExpr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::try_from(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_rust_syntax() {
        let expr = TypeExpr::map(
            TypeExpr::from(Primitive::String),
            TypeExpr::list(TypeExpr::generic("Pair", vec![
                TypeExpr::from(Primitive::I32),
                TypeExpr::param("T"),
            ])),
        );
        assert_eq!(expr.to_string(), "HashMap<String, Vec<Pair<i32, T>>>");
        assert_eq!(
            TypeExpr::array(TypeExpr::from(Primitive::U8), 4).to_string(),
            "[u8; 4]"
        );
    }

    #[test]
    fn test_substitute_binds_nested_params() {
        let template = TypeExpr::list(TypeExpr::generic("Pair", vec![
            TypeExpr::param("A"),
            TypeExpr::param("B"),
        ]));
        let bindings = HashMap::from([
            ("A".to_string(), TypeExpr::from(Primitive::I32)),
            ("B".to_string(), TypeExpr::from(Primitive::String)),
        ]);
        let resolved = template.substitute(&bindings).unwrap();
        assert_eq!(resolved.to_string(), "Vec<Pair<i32, String>>");
        assert!(resolved.first_param().is_none());
    }

    #[test]
    fn test_substitute_reports_unbound_param() {
        let template = TypeExpr::option(TypeExpr::param("T"));
        assert_eq!(template.substitute(&HashMap::new()), Err("T".to_string()));
    }

    #[test]
    fn test_bare_generic_name_matches_any_instantiation() {
        let bare = TypeExpr::named("Pair");
        let concrete = TypeExpr::generic("Pair", vec![TypeExpr::from(Primitive::I32)]);
        let other = TypeExpr::generic("Pair", vec![TypeExpr::from(Primitive::Bool)]);
        assert!(bare.matches(&concrete));
        assert!(concrete.matches(&concrete));
        assert!(!concrete.matches(&other));
    }

    #[test]
    fn test_primitive_aliases_parse() {
        assert_eq!("usize".parse::<Primitive>().unwrap(), Primitive::U64);
        assert_eq!("str".parse::<Primitive>().unwrap(), Primitive::String);
        assert_eq!(Primitive::U64.to_string(), "u64");
    }
}
