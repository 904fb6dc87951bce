//! Derive macros for loam
//!
//! Provides `#[derive(Model)]`, `#[derive(Embed)]`, and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod model;

/// Derive the `Model` and `FieldSet` traits for a persisted entity.
///
/// # Example
///
/// ```ignore
/// use loam::{BaseModel, Model};
///
/// #[derive(Debug, Clone, Default, Model)]
/// #[orm(table = "users")]
/// struct User {
///     #[orm(base)]
///     base: BaseModel,
///     name: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(flatten)]
///     address: Address,
///     #[orm(skip)]
///     cached_score: f64,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name; defaults to the snake_cased
///   struct name pluralized with `s`
/// - `#[orm(base)]` - The embedded `BaseModel` field (required, exactly one)
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(flatten)]` - Merge an `Embed` struct's columns into this entity
/// - `#[orm(skip)]` - Leave the field out of the column bindings
///
/// Do not also derive `FromRow`: `Model` already generates a hydrating
/// impl of it.
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand_model(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FieldSet` for a struct embedded in entities via `#[orm(flatten)]`.
///
/// # Example
///
/// ```ignore
/// use loam::Embed;
///
/// #[derive(Debug, Clone, Default, Embed)]
/// struct Address {
///     street: String,
///     city: String,
/// }
/// ```
#[proc_macro_derive(Embed, attributes(orm))]
pub fn derive_embed(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand_embed(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` for a plain result struct (projections, reports).
///
/// # Example
///
/// ```ignore
/// use loam::FromRow;
///
/// #[derive(FromRow)]
/// struct UserSummary {
///     id: i64,
///     name: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Fill the field from `Default` instead of the row
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
