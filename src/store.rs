//! Store Module
//!
//! The reservation store that owns accounts, the slot index and persistence.
//!
//! ## Responsibilities
//! - Enforce unique account names and unique slot ownership
//! - Reject out-of-range reservation keys
//! - Keep the slot index in step with every account's reservation list
//! - Write a full snapshot after every mutation

use std::path::Path;

use parking_lot::RwLock;

use crate::config::{Config, SnapshotFormat};
use crate::error::{Result, StoreError};
use crate::index::SlotIndex;
use crate::model::{Account, Day, ReservationKey, SLOTS_PER_DAY};
use crate::persist::{self, SnapshotWriter};

/// Inverse of one committed-in-memory mutation
///
/// Holds only what the mutation removed or replaced, so rolling back a
/// failed write costs as much as the change itself.
#[derive(Debug)]
enum Undo {
    AddAccount,
    RemoveAccount { pos: usize, account: Account },
    /// `order[i]` is the pre-sort position of the account now at `i`
    Sort { order: Vec<usize> },
    SetPassword { pos: usize, previous: String },
    AddReservation { pos: usize, key: ReservationKey },
    RemoveReservation { pos: usize, slot: usize, key: ReservationKey },
    /// Per account, the dropped keys with their original list positions (ascending)
    Sweep { removed: Vec<(usize, Vec<(usize, ReservationKey)>)> },
    Clear { lists: Vec<Vec<ReservationKey>> },
}

/// Accounts and index, always locked together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StoreState {
    /// Insertion order unless sorted by name
    accounts: Vec<Account>,

    /// Derived from `accounts`
    index: SlotIndex,
}

impl StoreState {
    /// Rebuild state from loaded accounts, rejecting anything that breaks an invariant
    fn from_accounts(accounts: Vec<Account>, path: &Path) -> Result<Self> {
        for (i, account) in accounts.iter().enumerate() {
            if accounts[..i].iter().any(|a| a.name == account.name) {
                return Err(StoreError::load(
                    path,
                    format!("account '{}' appears more than once", account.name),
                ));
            }
            if let Some(key) = account.reservations.iter().find(|k| !k.is_valid()) {
                return Err(StoreError::load(
                    path,
                    format!("account '{}' holds invalid reservation {}", account.name, key),
                ));
            }
        }

        let index = SlotIndex::from_accounts(&accounts).map_err(|key| {
            StoreError::load(path, format!("reservation {} is held more than once", key))
        })?;

        Ok(Self { accounts, index })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.name == name)
    }

    fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    fn add_account(&mut self, name: &str, password: &str) -> Result<Undo> {
        if self.position(name).is_some() {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        self.accounts.push(Account::new(name, password));
        Ok(Undo::AddAccount)
    }

    fn remove_account(&mut self, name: &str) -> Result<(usize, Undo)> {
        let pos = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(format!("account '{}'", name)))?;
        let account = self.accounts.remove(pos);
        for key in &account.reservations {
            self.index.remove(key);
        }
        Ok((account.reservations.len(), Undo::RemoveAccount { pos, account }))
    }

    fn sort_by_name(&mut self) -> Undo {
        let mut indexed: Vec<(usize, Account)> = self.accounts.drain(..).enumerate().collect();
        indexed.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        let order = indexed.iter().map(|(i, _)| *i).collect();
        self.accounts = indexed.into_iter().map(|(_, a)| a).collect();
        Undo::Sort { order }
    }

    fn set_password(&mut self, name: &str, old: &str, new: &str) -> Result<Undo> {
        let pos = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(format!("account '{}'", name)))?;
        let account = &mut self.accounts[pos];
        if account.password != old {
            return Err(StoreError::WrongPassword(name.to_string()));
        }
        let previous = std::mem::replace(&mut account.password, new.to_string());
        Ok(Undo::SetPassword { pos, previous })
    }

    fn add_reservation(&mut self, name: &str, key: ReservationKey) -> Result<Undo> {
        // Check order: range, then ownership, then account
        if !key.is_valid() {
            return Err(StoreError::InvalidKey(key));
        }
        if self.index.contains(&key) {
            return Err(StoreError::Conflict(key));
        }
        let pos = self
            .position(name)
            .ok_or_else(|| StoreError::NoSuchAccount(name.to_string()))?;

        self.accounts[pos].reservations.push(key);
        self.index.insert(key, name.to_string());
        Ok(Undo::AddReservation { pos, key })
    }

    fn remove_reservation(&mut self, name: &str, key: &ReservationKey) -> Result<Undo> {
        let not_found = || StoreError::NotFound(format!("reservation {} of '{}'", key, name));

        let pos = self.position(name).ok_or_else(not_found)?;
        let reservations = &mut self.accounts[pos].reservations;
        let slot = reservations.iter().position(|k| k == key).ok_or_else(not_found)?;

        reservations.remove(slot);
        self.index.remove(key);
        Ok(Undo::RemoveReservation {
            pos,
            slot,
            key: *key,
        })
    }

    fn remove_reservations_before(&mut self, day: Day) -> (usize, Undo) {
        let mut removed = Vec::new();
        for (pos, account) in self.accounts.iter_mut().enumerate() {
            let mut dropped = Vec::new();
            let mut slot = 0;
            account.reservations.retain(|key| {
                let keep = key.day() >= day;
                if !keep {
                    dropped.push((slot, *key));
                }
                slot += 1;
                keep
            });
            for (_, key) in &dropped {
                self.index.remove(key);
            }
            if !dropped.is_empty() {
                removed.push((pos, dropped));
            }
        }
        let count = removed.iter().map(|(_, d)| d.len()).sum();
        (count, Undo::Sweep { removed })
    }

    fn clear_all_reservations(&mut self) -> (usize, Undo) {
        let count = self.index.len();
        let lists = self
            .accounts
            .iter_mut()
            .map(|a| std::mem::take(&mut a.reservations))
            .collect();
        self.index.clear();
        (count, Undo::Clear { lists })
    }

    /// Reverse a mutation that has not been persisted
    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::AddAccount => {
                self.accounts.pop();
            }
            Undo::RemoveAccount { pos, account } => {
                for key in &account.reservations {
                    self.index.insert(*key, account.name.clone());
                }
                self.accounts.insert(pos, account);
            }
            Undo::Sort { order } => {
                let mut indexed: Vec<(usize, Account)> =
                    order.into_iter().zip(self.accounts.drain(..)).collect();
                indexed.sort_by_key(|(i, _)| *i);
                self.accounts = indexed.into_iter().map(|(_, a)| a).collect();
            }
            Undo::SetPassword { pos, previous } => {
                self.accounts[pos].password = previous;
            }
            Undo::AddReservation { pos, key } => {
                self.accounts[pos].reservations.pop();
                self.index.remove(&key);
            }
            Undo::RemoveReservation { pos, slot, key } => {
                let account = &mut self.accounts[pos];
                account.reservations.insert(slot, key);
                self.index.insert(key, account.name.clone());
            }
            Undo::Sweep { removed } => {
                for (pos, dropped) in removed {
                    let account = &mut self.accounts[pos];
                    // Ascending original positions rebuild the original order
                    for (slot, key) in dropped {
                        account.reservations.insert(slot, key);
                        self.index.insert(key, account.name.clone());
                    }
                }
            }
            Undo::Clear { lists } => {
                for (account, list) in self.accounts.iter_mut().zip(lists) {
                    for key in &list {
                        self.index.insert(*key, account.name.clone());
                    }
                    account.reservations = list;
                }
            }
        }
    }

    fn assert_invariants(&self) {
        if cfg!(debug_assertions) {
            let mut listed = 0;
            for (i, account) in self.accounts.iter().enumerate() {
                debug_assert!(
                    self.accounts[..i].iter().all(|a| a.name != account.name),
                    "Invariant violated: duplicate account name {}",
                    account.name
                );
                for key in &account.reservations {
                    debug_assert!(key.is_valid(), "Invariant violated: invalid key {}", key);
                    debug_assert_eq!(
                        self.index.owner(key),
                        Some(account.name.as_str()),
                        "Invariant violated: index disagrees on {}",
                        key
                    );
                    listed += 1;
                }
            }
            debug_assert_eq!(
                listed,
                self.index.len(),
                "Invariant violated: index holds keys no account lists"
            );
        }
    }
}

/// The reservation store
///
/// ## Concurrency Model: one readers-writer lock
///
/// - **Queries** (`reservations_on_day`, `password_of`, ...): shared lock,
///   run in parallel with each other
/// - **Mutations** (`add_*`, `remove_*`, `set_password`, `sort_by_name`, ...):
///   exclusive lock held for the whole call, snapshot write included
///
/// Accounts and index sit behind the same lock and are never locked apart.
///
/// ## Failure atomicity
/// A mutation validates first, applies in place and records an [`Undo`] of
/// just what it changed. If the snapshot write then fails, the undo is
/// replayed before the lock is released, so the in-memory state is left
/// exactly as it was.
pub struct Store {
    state: RwLock<StoreState>,

    /// `None` for purely in-memory stores
    writer: Option<SnapshotWriter>,
}

impl Store {
    /// Create an empty store that is never persisted
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            writer: None,
        }
    }

    /// Create an empty store persisted through `writer`
    ///
    /// Nothing is written until the first mutation or [`Store::save`].
    pub fn new(writer: SnapshotWriter) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            writer: Some(writer),
        }
    }

    /// Load the snapshot at `path`, persisting back to it as pretty JSON
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(SnapshotWriter::new(path, SnapshotFormat::Pretty, true))
    }

    /// Load the snapshot at the writer's path
    ///
    /// Fails with [`StoreError::Load`] if the file is missing, malformed, or
    /// breaks a store invariant (duplicate name, invalid or doubly held key).
    pub fn load_with(writer: SnapshotWriter) -> Result<Self> {
        let accounts = persist::read_snapshot(writer.path())?;
        let state = StoreState::from_accounts(accounts, writer.path())?;

        tracing::info!(
            path = %writer.path().display(),
            accounts = state.accounts.len(),
            reservations = state.index.len(),
            "Loaded snapshot"
        );

        Ok(Self {
            state: RwLock::new(state),
            writer: Some(writer),
        })
    }

    /// Open the configured snapshot, or start empty if the file does not exist
    ///
    /// A file that exists but cannot be loaded is an error; it is never
    /// overwritten with an empty store.
    pub fn open(config: &Config) -> Result<Self> {
        let writer = SnapshotWriter::from_config(config);
        if writer.path().exists() {
            Self::load_with(writer)
        } else {
            tracing::warn!(
                path = %writer.path().display(),
                "Snapshot not found, starting with an empty store"
            );
            Ok(Self::new(writer))
        }
    }

    /// Persistence target, if any
    pub fn data_file(&self) -> Option<&Path> {
        self.writer.as_ref().map(SnapshotWriter::path)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the full state to the snapshot file
    ///
    /// Takes the exclusive lock so no mutation interleaves with the write.
    /// A no-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let state = self.state.write();
        if let Some(writer) = &self.writer {
            writer.write(&state.accounts)?;
        }
        Ok(())
    }

    /// Encode the full state in `format`
    pub fn snapshot(&self, format: SnapshotFormat) -> Result<Vec<u8>> {
        let state = self.state.read();
        persist::encode(&state.accounts, format)
    }

    /// Pretty JSON of every account, plaintext passwords included
    ///
    /// Meant for an administrative viewer; callers are responsible for
    /// restricting who sees it.
    pub fn snapshot_readable(&self) -> Result<Vec<u8>> {
        self.snapshot(SnapshotFormat::Pretty)
    }

    /// Run `op` under the exclusive lock and keep it only if it persists
    ///
    /// `op` must validate before it mutates: on `Err` the state is assumed
    /// untouched. If the snapshot write fails, the returned [`Undo`] is
    /// applied and the write error is returned.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> Result<(T, Undo)>) -> Result<T> {
        let mut state = self.state.write();

        let (out, undo) = op(&mut state)?;
        if let Some(writer) = &self.writer {
            if let Err(e) = writer.write(&state.accounts) {
                state.undo(undo);
                state.assert_invariants();
                tracing::warn!("Snapshot write failed, mutation rolled back: {}", e);
                return Err(e);
            }
        }

        state.assert_invariants();
        Ok(out)
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Append a new account with no reservations
    pub fn add_account(&self, name: &str, password: &str) -> Result<()> {
        self.mutate(|state| Ok(((), state.add_account(name, password)?)))?;
        tracing::debug!(account = name, "Account added");
        Ok(())
    }

    /// Add the account unless one with that name already exists
    ///
    /// Returns whether the account was created.
    pub fn ensure_account(&self, name: &str, password: &str) -> Result<bool> {
        match self.add_account(name, password) {
            Ok(()) => Ok(true),
            Err(StoreError::DuplicateName(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove an account and release every slot it held
    pub fn remove_account(&self, name: &str) -> Result<()> {
        let removed = self.mutate(|state| state.remove_account(name))?;
        tracing::debug!(
            account = name,
            released = removed,
            "Account removed"
        );
        Ok(())
    }

    /// Order accounts lexicographically by name
    pub fn sort_by_name(&self) -> Result<()> {
        self.mutate(|state| Ok(((), state.sort_by_name())))
    }

    /// Replace the password if `old` matches exactly
    pub fn set_password(&self, name: &str, old: &str, new: &str) -> Result<()> {
        self.mutate(|state| Ok(((), state.set_password(name, old, new)?)))?;
        tracing::debug!(account = name, "Password changed");
        Ok(())
    }

    // =========================================================================
    // Reservation Management
    // =========================================================================

    /// Book `key` for `name`
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidKey`] - key outside the accepted ranges
    /// - [`StoreError::Conflict`] - slot already owned, by anyone including `name`
    /// - [`StoreError::NoSuchAccount`] - no account called `name`
    pub fn add_reservation(&self, name: &str, key: ReservationKey) -> Result<()> {
        self.mutate(|state| Ok(((), state.add_reservation(name, key)?)))?;
        tracing::debug!(account = name, %key, "Reservation added");
        Ok(())
    }

    /// Cancel `key` for `name`
    ///
    /// Fails with [`StoreError::NotFound`] if the account does not exist or
    /// does not hold `key`.
    pub fn remove_reservation(&self, name: &str, key: &ReservationKey) -> Result<()> {
        self.mutate(|state| Ok(((), state.remove_reservation(name, key)?)))?;
        tracing::debug!(account = name, %key, "Reservation removed");
        Ok(())
    }

    /// Drop every reservation dated strictly before `day`
    ///
    /// Slots are ignored: everything on `day` itself is kept. Returns the
    /// number of reservations removed.
    pub fn remove_reservations_before(&self, day: Day) -> Result<usize> {
        let removed = self.mutate(|state| Ok(state.remove_reservations_before(day)))?;
        tracing::info!(before = %day, removed, "Removed past reservations");
        Ok(removed)
    }

    /// Drop every reservation dated before today (local time)
    pub fn remove_past_reservations(&self) -> Result<usize> {
        self.remove_reservations_before(Day::today())
    }

    /// Empty every account's list and the whole index
    pub fn clear_all_reservations(&self) -> Result<usize> {
        let removed = self.mutate(|state| Ok(state.clear_all_reservations()))?;
        tracing::info!(removed, "Cleared all reservations");
        Ok(removed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Owner of each slot 0..24 on `day`; `None` marks a free slot
    pub fn reservations_on_day(&self, day: &Day) -> [Option<String>; SLOTS_PER_DAY] {
        self.state.read().index.day(day)
    }

    /// Stored password of `name`
    pub fn password_of(&self, name: &str) -> Result<String> {
        self.state
            .read()
            .account(name)
            .map(|a| a.password.clone())
            .ok_or_else(|| StoreError::NotFound(format!("account '{}'", name)))
    }

    /// Check a login without exposing the stored password
    pub fn verify_password(&self, name: &str, password: &str) -> Result<()> {
        if self.password_of(name)? == password {
            Ok(())
        } else {
            Err(StoreError::WrongPassword(name.to_string()))
        }
    }

    /// Owner of `key`, if reserved
    pub fn owner_of(&self, key: &ReservationKey) -> Option<String> {
        self.state.read().index.owner(key).map(str::to_owned)
    }

    /// Reservations of `name` in booking order
    pub fn reservations_of(&self, name: &str) -> Result<Vec<ReservationKey>> {
        self.state
            .read()
            .account(name)
            .map(|a| a.reservations.clone())
            .ok_or_else(|| StoreError::NotFound(format!("account '{}'", name)))
    }

    /// Account names in store order
    pub fn account_names(&self) -> Vec<String> {
        self.state.read().accounts.iter().map(|a| a.name.clone()).collect()
    }

    /// Copy of every account in store order
    pub fn accounts(&self) -> Vec<Account> {
        self.state.read().accounts.clone()
    }

    pub fn account_count(&self) -> usize {
        self.state.read().accounts.len()
    }

    /// Number of reserved slots across all accounts
    pub fn reservation_count(&self) -> usize {
        self.state.read().index.len()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::in_memory()
    }
}
