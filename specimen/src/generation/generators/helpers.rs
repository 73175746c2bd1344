//! Small generators for common overrides

use anyhow::bail;
use serde_json::Value as JsonValue;
use serde_json::json;

use super::Generator;
use crate::generation::random::Random;
use crate::schema::Primitive;
use crate::schema::TypeExpr;
use crate::settings::SizeRange;

/// Generator backed by a closure, optionally limited to one type
pub struct FnGenerator<F> {
    generate: F,
    target:   Option<TypeExpr>,
}

/// Generator calling `generate` for every value
pub fn from_fn<F>(generate: F) -> FnGenerator<F>
where
    F: Fn(&mut Random) -> anyhow::Result<JsonValue> + Send + Sync,
{
    FnGenerator {
        generate,
        target: None,
    }
}

impl<F> FnGenerator<F> {
    /// Only support `ty` when registered as a custom generator
    #[must_use]
    pub fn for_type(mut self, ty: TypeExpr) -> Self {
        self.target = Some(ty);
        self
    }
}

impl<F> Generator for FnGenerator<F>
where
    F: Fn(&mut Random) -> anyhow::Result<JsonValue> + Send + Sync,
{
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue> { (self.generate)(random) }

    fn supports(&self, ty: &TypeExpr) -> bool {
        self.target.as_ref().is_none_or(|target| target.matches(ty))
    }
}

/// Integers in an inclusive range
pub struct IntGenerator {
    min: i64,
    max: i64,
}

/// Integers in `min..=max`
pub const fn ints(min: i64, max: i64) -> IntGenerator { IntGenerator { min, max } }

impl Generator for IntGenerator {
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue> {
        if self.min > self.max {
            bail!("int range {}..={} is empty", self.min, self.max);
        }
        let value = random.int_range(i128::from(self.min), i128::from(self.max));
        Ok(json!(i64::try_from(value)?))
    }
}

/// A uniformly chosen value from a fixed list
pub struct OneOf {
    values: Vec<JsonValue>,
}

/// One of `values`, chosen uniformly
pub fn one_of(values: impl IntoIterator<Item = JsonValue>) -> OneOf {
    OneOf {
        values: values.into_iter().collect(),
    }
}

impl Generator for OneOf {
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue> {
        match random.choose(&self.values) {
            Some(value) => Ok(value.clone()),
            None => bail!("one_of has no values to choose from"),
        }
    }
}

/// Upper-case strings with an optional prefix
pub struct StringGenerator {
    prefix: String,
    length: SizeRange,
}

/// Upper-case strings with a length in `length`
pub const fn strings(length: SizeRange) -> StringGenerator {
    StringGenerator {
        prefix: String::new(),
        length,
    }
}

impl StringGenerator {
    /// Prepend `prefix`; it does not count towards the length
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Generator for StringGenerator {
    fn generate(&self, random: &mut Random) -> anyhow::Result<JsonValue> {
        let len = random.usize_range(self.length.min, self.length.max);
        Ok(JsonValue::String(format!("{}{}", self.prefix, random.upper_alpha(len))))
    }

    fn supports(&self, ty: &TypeExpr) -> bool { matches!(ty, TypeExpr::Primitive(Primitive::String)) }
}
