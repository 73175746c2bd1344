//! Default producers for primitive and enum nodes

use serde_json::Value as JsonValue;
use serde_json::json;

use crate::generation::random::Random;
use crate::schema::Primitive;
use crate::settings::Settings;

/// A random value of `primitive` within the configured ranges
///
/// Integer ranges are clamped to the bounds of the integer type. When the configured range lies
/// entirely outside them the full range of the type is used instead.
pub(crate) fn primitive_value(primitive: Primitive, random: &mut Random, settings: &Settings) -> JsonValue {
    if let Some((type_min, type_max)) = primitive.integer_bounds() {
        let configured = (i128::from(settings.int_range.min), i128::from(settings.int_range.max));
        let (min, max) = match (configured.0.max(type_min), configured.1.min(type_max)) {
            (min, max) if min <= max => (min, max),
            _ => (type_min, type_max),
        };
        return integer_json(random.int_range(min, max));
    }
    match primitive {
        Primitive::Bool => json!(random.bool()),
        Primitive::Char => json!(random.upper_char().to_string()),
        Primitive::String => {
            let len = random.usize_range(settings.string_length.min, settings.string_length.max);
            JsonValue::String(random.upper_alpha(len))
        }
        Primitive::F32 => {
            #[allow(clippy::cast_possible_truncation, reason = "f32 fields hold f32 precision")]
            let value = random.f64_range(settings.float_range.min, settings.float_range.max) as f32;
            json!(f64::from(value))
        }
        Primitive::F64 => json!(random.f64_range(settings.float_range.min, settings.float_range.max)),
        Primitive::I8
        | Primitive::I16
        | Primitive::I32
        | Primitive::I64
        | Primitive::U8
        | Primitive::U16
        | Primitive::U32
        | Primitive::U64 => JsonValue::Null,
    }
}

fn integer_json(value: i128) -> JsonValue {
    if let Ok(signed) = i64::try_from(value) {
        json!(signed)
    } else if let Ok(unsigned) = u64::try_from(value) {
        json!(unsigned)
    } else {
        JsonValue::Null
    }
}

/// One of the variant names, or null for an enum without variants
pub(crate) fn enum_variant(variants: &[String], random: &mut Random) -> JsonValue {
    random
        .choose(variants)
        .map_or(JsonValue::Null, |variant| JsonValue::String(variant.clone()))
}
