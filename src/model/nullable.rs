//! `null` handling for plain fields
//!
//! Upstream sometimes publishes `null` where a string, list, map or object is
//! expected. A `null` leaves the field at its default, the same as an absent
//! key. Values of the wrong JSON type still fail.

use serde::{Deserialize, Deserializer};

/// `#[serde(deserialize_with = "nullable::deserialize")]`
pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
