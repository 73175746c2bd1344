// ============================================================================
// NODE MODEL CONSTANTS
// ============================================================================

/// Default maximum node depth; deeper positions become opaque terminals
pub const DEFAULT_MAX_DEPTH: usize = 8;

// ============================================================================
// GENERATION DEFAULTS
// ============================================================================

pub const DEFAULT_COLLECTION_MIN_SIZE: usize = 2;
pub const DEFAULT_COLLECTION_MAX_SIZE: usize = 6;
pub const DEFAULT_STRING_MIN_LENGTH: usize = 3;
pub const DEFAULT_STRING_MAX_LENGTH: usize = 10;
pub const DEFAULT_INT_MIN: i64 = 1;
pub const DEFAULT_INT_MAX: i64 = 10_000;
pub const DEFAULT_FLOAT_MIN: f64 = 1.0;
pub const DEFAULT_FLOAT_MAX: f64 = 10_000.0;

/// One in six, the rate used for nullable positions
pub const DEFAULT_NULLABLE_PROBABILITY: f64 = 1.0 / 6.0;

/// Retries allowed when a set or map keeps producing duplicate keys
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 1000;

/// Percentage applied when a range bound pushes its companion bound
pub const RANGE_ADJUSTMENT_PERCENTAGE: usize = 50;

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Environment variable holding a global seed
pub const SEED_ENV_VAR: &str = "SPECIMEN_SEED";

/// Environment variable holding the stderr tracing level
pub const LOG_ENV_VAR: &str = "SPECIMEN_LOG";

// ============================================================================
// TYPE NAME CONSTANTS
// ============================================================================

pub const TYPE_BOOL: &str = "bool";
pub const TYPE_CHAR: &str = "char";
pub const TYPE_I8: &str = "i8";
pub const TYPE_I16: &str = "i16";
pub const TYPE_I32: &str = "i32";
pub const TYPE_I64: &str = "i64";
pub const TYPE_ISIZE: &str = "isize";
pub const TYPE_U8: &str = "u8";
pub const TYPE_U16: &str = "u16";
pub const TYPE_U32: &str = "u32";
pub const TYPE_U64: &str = "u64";
pub const TYPE_USIZE: &str = "usize";
pub const TYPE_F32: &str = "f32";
pub const TYPE_F64: &str = "f64";
pub const TYPE_STRING: &str = "String";
pub const TYPE_STR: &str = "str";

// Container names understood by the type-expression parser
pub const TYPE_VEC: &str = "Vec";
pub const TYPE_VEC_DEQUE: &str = "VecDeque";
pub const TYPE_HASH_SET: &str = "HashSet";
pub const TYPE_BTREE_SET: &str = "BTreeSet";
pub const TYPE_HASH_MAP: &str = "HashMap";
pub const TYPE_BTREE_MAP: &str = "BTreeMap";
pub const TYPE_OPTION: &str = "Option";
pub const TYPE_BOX: &str = "Box";
pub const TYPE_RC: &str = "Rc";
pub const TYPE_ARC: &str = "Arc";
