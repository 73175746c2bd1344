//! Typed settings for one generation call
//!
//! Settings deserialize from JSON with every key optional. Range pairs keep themselves consistent:
//! moving one bound past the other pushes the other bound by [`RANGE_ADJUSTMENT_PERCENTAGE`].

use error_stack::Report;
use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumString;
use tracing::warn;

use crate::constants::DEFAULT_COLLECTION_MAX_SIZE;
use crate::constants::DEFAULT_COLLECTION_MIN_SIZE;
use crate::constants::DEFAULT_FLOAT_MAX;
use crate::constants::DEFAULT_FLOAT_MIN;
use crate::constants::DEFAULT_INT_MAX;
use crate::constants::DEFAULT_INT_MIN;
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::constants::DEFAULT_MAX_GENERATION_ATTEMPTS;
use crate::constants::DEFAULT_NULLABLE_PROBABILITY;
use crate::constants::DEFAULT_STRING_MAX_LENGTH;
use crate::constants::DEFAULT_STRING_MIN_LENGTH;
use crate::constants::RANGE_ADJUSTMENT_PERCENTAGE;
use crate::constants::SEED_ENV_VAR;
use crate::error::Error;
use crate::error::Result;

/// Inclusive size bounds for collections, maps and strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    /// Smallest size
    pub min: usize,
    /// Largest size
    pub max: usize,
}

impl SizeRange {
    /// Checked constructor; `min` may not exceed `max`
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(Error::invalid("size range", format!("min {min} > max {max}")).into());
        }
        Ok(Self { min, max })
    }

    /// A range containing exactly one size
    pub const fn exactly(size: usize) -> Self { Self { min: size, max: size } }

    /// Set the lower bound, raising the upper bound if it would fall below it
    #[must_use]
    pub const fn with_min(self, min: usize) -> Self {
        let max = if min > self.max {
            min.saturating_add(size_adjustment(min))
        } else {
            self.max
        };
        Self { min, max }
    }

    /// Set the upper bound, lowering the lower bound if it would rise above it
    #[must_use]
    pub const fn with_max(self, max: usize) -> Self {
        let min = if max < self.min {
            max.saturating_sub(size_adjustment(max))
        } else {
            self.min
        };
        Self { min, max }
    }
}

const fn size_adjustment(bound: usize) -> usize {
    bound.saturating_mul(RANGE_ADJUSTMENT_PERCENTAGE) / 100
}

/// Inclusive bounds for generated integers, clamped to each integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    /// Smallest value
    pub min: i64,
    /// Largest value
    pub max: i64,
}

impl IntRange {
    /// Set the lower bound, raising the upper bound if it would fall below it
    #[must_use]
    pub const fn with_min(self, min: i64) -> Self {
        let max = if min > self.max {
            min.saturating_add(adjustment(min))
        } else {
            self.max
        };
        Self { min, max }
    }

    /// Set the upper bound, lowering the lower bound if it would rise above it
    #[must_use]
    pub const fn with_max(self, max: i64) -> Self {
        let min = if max < self.min {
            max.saturating_sub(adjustment(max))
        } else {
            self.min
        };
        Self { min, max }
    }
}

#[allow(clippy::cast_possible_wrap, reason = "the percentage is a small constant")]
const fn adjustment(bound: i64) -> i64 {
    bound.saturating_abs().saturating_mul(RANGE_ADJUSTMENT_PERCENTAGE as i64) / 100
}

/// Bounds for generated floats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

/// What a back-reference node produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackReferencePolicy {
    /// Leave the reference empty
    #[default]
    Null,
    /// Point at the nearest ancestor instance of the same type
    Ancestor,
}

/// Knobs for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Seed for the call; `None` falls back to the environment, then to a fresh seed
    pub seed:                    Option<u64>,
    /// Nodes deeper than this are opaque
    pub max_depth:               usize,
    /// Element count for lists and sets
    pub collection_size:         SizeRange,
    /// Entry count for maps
    pub map_size:                SizeRange,
    /// Length of generated strings
    pub string_length:           SizeRange,
    /// Bounds for generated integers
    pub int_range:               IntRange,
    /// Bounds for generated floats
    pub float_range:             FloatRange,
    /// Chance of null at nullable positions
    pub nullable_probability:    f64,
    /// Whether `Option<T>` positions are nullable without an explicit selector
    pub options_nullable:        bool,
    /// What a back-reference node produces
    pub back_references:         BackReferencePolicy,
    /// Suppress the unused-selector failure
    pub lenient:                 bool,
    /// Abort on the first generator failure instead of substituting null
    pub fail_on_error:           bool,
    /// Log the node tree before generating
    pub verbose:                 bool,
    /// Duplicates tolerated while filling a set or map, and attempts per filtered or unique node
    pub max_generation_attempts: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed:                    None,
            max_depth:               DEFAULT_MAX_DEPTH,
            collection_size:         SizeRange {
                min: DEFAULT_COLLECTION_MIN_SIZE,
                max: DEFAULT_COLLECTION_MAX_SIZE,
            },
            map_size:                SizeRange {
                min: DEFAULT_COLLECTION_MIN_SIZE,
                max: DEFAULT_COLLECTION_MAX_SIZE,
            },
            string_length:           SizeRange {
                min: DEFAULT_STRING_MIN_LENGTH,
                max: DEFAULT_STRING_MAX_LENGTH,
            },
            int_range:               IntRange {
                min: DEFAULT_INT_MIN,
                max: DEFAULT_INT_MAX,
            },
            float_range:             FloatRange {
                min: DEFAULT_FLOAT_MIN,
                max: DEFAULT_FLOAT_MAX,
            },
            nullable_probability:    DEFAULT_NULLABLE_PROBABILITY,
            options_nullable:        true,
            back_references:         BackReferencePolicy::Null,
            lenient:                 false,
            fail_on_error:           true,
            verbose:                 false,
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }
}

impl Settings {
    /// Load settings from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Report::new(Error::invalid("settings", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults with the seed taken from the environment, if set
    pub fn from_env() -> Self {
        Self {
            seed: seed_from_env(),
            ..Self::default()
        }
    }

    /// Reject inverted ranges and probabilities outside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("collection_size", self.collection_size),
            ("map_size", self.map_size),
            ("string_length", self.string_length),
        ] {
            if range.min > range.max {
                return Err(Error::invalid(
                    name,
                    format!("min {} > max {}", range.min, range.max),
                )
                .into());
            }
        }
        if self.int_range.min > self.int_range.max {
            return Err(Error::invalid(
                "int_range",
                format!("min {} > max {}", self.int_range.min, self.int_range.max),
            )
            .into());
        }
        if !(self.float_range.min <= self.float_range.max) {
            return Err(Error::invalid(
                "float_range",
                format!("min {} > max {}", self.float_range.min, self.float_range.max),
            )
            .into());
        }
        if !(0.0..=1.0).contains(&self.nullable_probability) {
            return Err(Error::invalid(
                "nullable_probability",
                format!("{} is outside [0, 1]", self.nullable_probability),
            )
            .into());
        }
        Ok(())
    }
}

/// Seed from `SPECIMEN_SEED`, ignoring values that do not parse
pub fn seed_from_env() -> Option<u64> {
    let raw = std::env::var(SEED_ENV_VAR).ok()?;
    raw.trim().parse().map_or_else(
        |_| {
            warn!(value = %raw, "Ignoring {SEED_ENV_VAR}: not an unsigned integer");
            None
        },
        Some,
    )
}
