//! Slot index implementation
//!
//! HashMap keyed by the full four-field reservation key.

use std::collections::HashMap;

use crate::model::{Account, Day, ReservationKey, SLOTS_PER_DAY};

/// Maps each reserved key to its owner's name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotIndex {
    owners: HashMap<ReservationKey, String>,
}

impl SlotIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index by scanning every account's reservation list
    ///
    /// Returns the first key found under two owners (or twice under one).
    pub fn from_accounts(accounts: &[Account]) -> Result<Self, ReservationKey> {
        let mut index = Self::new();
        for account in accounts {
            for key in &account.reservations {
                if index.insert(*key, account.name.clone()).is_some() {
                    return Err(*key);
                }
            }
        }
        Ok(index)
    }

    /// Owner of `key`, if reserved
    pub fn owner(&self, key: &ReservationKey) -> Option<&str> {
        self.owners.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &ReservationKey) -> bool {
        self.owners.contains_key(key)
    }

    /// Record `owner` for `key`, returning the previous owner
    pub fn insert(&mut self, key: ReservationKey, owner: String) -> Option<String> {
        self.owners.insert(key, owner)
    }

    /// Forget `key`, returning its owner
    pub fn remove(&mut self, key: &ReservationKey) -> Option<String> {
        self.owners.remove(key)
    }

    pub fn clear(&mut self) {
        self.owners.clear();
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Owners of slots 0..24 on `day`; `None` marks a free slot
    pub fn day(&self, day: &Day) -> [Option<String>; SLOTS_PER_DAY] {
        std::array::from_fn(|slot| self.owner(&day.key(slot as i32)).map(str::to_owned))
    }

    /// Iterate over all `(key, owner)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&ReservationKey, &str)> {
        self.owners.iter().map(|(k, v)| (k, v.as_str()))
    }
}
