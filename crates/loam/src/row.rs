//! Row mapping traits.

use crate::connection::Row;
use crate::error::OrmResult;

/// Trait for converting a result row into a Rust struct.
///
/// Typically derived with `#[derive(FromRow)]` for plain read models. Types
/// deriving `Model` get an impl generated alongside it that also marks the
/// entity as existing and syncs its original values; do not derive both.
///
/// # Example
///
/// ```ignore
/// use loam::FromRow;
///
/// #[derive(Default, FromRow)]
/// struct UserSummary {
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a result row into Self.
    ///
    /// Columns present in the row but not mapped by the destination are
    /// discarded. A mapped field missing from the row is an
    /// [`OrmError::InvalidDestination`](crate::OrmError::InvalidDestination)
    /// for derived read models; entity hydration through `Model` instead
    /// leaves such fields at their default.
    fn from_row(row: &Row) -> OrmResult<Self>;
}
