//! Account records

use serde::{Deserialize, Deserializer, Serialize};

use super::ReservationKey;

/// A named account and the reservations it owns
///
/// Serialized with the field names of the legacy `users.json` files.
/// `Entries` is accepted as an older name for `Reservations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub name: String,

    /// Stored and compared in plaintext
    pub password: String,

    #[serde(alias = "Entries", default, deserialize_with = "null_as_empty")]
    pub reservations: Vec<ReservationKey>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ReservationKey>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ReservationKey>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Account {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            reservations: Vec::new(),
        }
    }

    pub fn holds(&self, key: &ReservationKey) -> bool {
        self.reservations.contains(key)
    }
}
