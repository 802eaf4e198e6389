//! Serde helpers shared by request DTOs.

use serde::{Deserialize, Deserializer};

/// Deserializer for `Option<Option<T>>` patch fields.
///
/// With the plain derive, an explicit JSON `null` collapses to the outer
/// `None` and becomes indistinguishable from an omitted field. Combined
/// with `#[serde(default)]`, this helper keeps the two apart: omitted
/// stays `None` (keep the prior value) while `null` becomes `Some(None)`
/// (clear the column).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
