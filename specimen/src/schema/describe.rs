//! The `Describe` trait: Rust types that can produce their own descriptor
//!
//! Structs and unit-only enums get it from `#[derive(Describe)]`; the implementations below
//! cover primitives and the std containers the derive maps onto [`TypeExpr`] variants.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use super::registry::TypeRegistry;
use super::type_expr::Primitive;
use super::type_expr::TypeExpr;

/// A type that knows its [`TypeExpr`] and can register the definitions it refers to
pub trait Describe {
    /// Expression for this type with all generic arguments resolved
    fn type_expr() -> TypeExpr;

    /// Add this type's definition, and those of its members, to `registry`
    ///
    /// Implementations must insert their own definition before recursing so self-referential
    /// types terminate.
    fn register(_registry: &mut TypeRegistry) {}
}

macro_rules! describe_primitive {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_expr() -> TypeExpr { TypeExpr::Primitive(Primitive::$primitive) }
            }
        )*
    };
}

describe_primitive!(
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    str => String,
);

macro_rules! describe_wrapper {
    ($($wrapper:ident),* $(,)?) => {
        $(
            impl<T: Describe + ?Sized> Describe for $wrapper<T> {
                fn type_expr() -> TypeExpr { T::type_expr() }

                fn register(registry: &mut TypeRegistry) { T::register(registry); }
            }
        )*
    };
}

// Smart pointers are transparent
describe_wrapper!(Box, Rc, Arc);

impl<T: Describe> Describe for Option<T> {
    fn type_expr() -> TypeExpr { TypeExpr::option(T::type_expr()) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

impl<T: Describe> Describe for Vec<T> {
    fn type_expr() -> TypeExpr { TypeExpr::list(T::type_expr()) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn type_expr() -> TypeExpr { TypeExpr::list(T::type_expr()) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn type_expr() -> TypeExpr { TypeExpr::set(T::type_expr()) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn type_expr() -> TypeExpr { TypeExpr::set(T::type_expr()) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn type_expr() -> TypeExpr { TypeExpr::map(K::type_expr(), V::type_expr()) }

    fn register(registry: &mut TypeRegistry) {
        K::register(registry);
        V::register(registry);
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn type_expr() -> TypeExpr { TypeExpr::map(K::type_expr(), V::type_expr()) }

    fn register(registry: &mut TypeRegistry) {
        K::register(registry);
        V::register(registry);
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_expr() -> TypeExpr { TypeExpr::array(T::type_expr(), N) }

    fn register(registry: &mut TypeRegistry) { T::register(registry); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_containers_map_to_type_exprs() {
        assert_eq!(
            <HashMap<String, Vec<Option<u8>>>>::type_expr().to_string(),
            "HashMap<String, Vec<Option<u8>>>"
        );
        assert_eq!(<Box<[i32; 3]>>::type_expr().to_string(), "[i32; 3]");
        assert_eq!(<BTreeSet<usize>>::type_expr().to_string(), "HashSet<u64>");
    }

    #[test]
    fn test_primitives_register_nothing() {
        let registry = TypeRegistry::of::<Vec<String>>();
        assert!(registry.is_empty());
    }
}
