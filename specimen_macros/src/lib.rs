//! Procedural macros for specimen

mod describe;

use proc_macro::TokenStream;

/// Derives `specimen::Describe` for structs with named fields and unit-only enums.
///
/// # Example
///
/// ```ignore
/// #[derive(Describe)]
/// struct Page<T> {
///     items: Vec<T>,
///     next:  Option<Box<Page<T>>>,
/// }
///
/// #[derive(Describe)]
/// #[describe(rename_all = "snake_case")]
/// enum Status {
///     Active,
///     OnHold,
/// }
/// ```
///
/// This will generate:
/// - `type_expr()` naming the type by its identifier, with generic arguments resolved
/// - `register()` inserting the definition (field types written with `Param` for generics)
///   before registering every field type
///
/// `rename_all` accepts the serde spellings `snake_case`, `kebab-case`, `camelCase`,
/// `SCREAMING_SNAKE_CASE`, `lowercase` and `UPPERCASE`, and applies to field names on structs
/// and variant names on enums.
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream { describe::derive_describe_impl(input) }
