//! # SlotBook
//!
//! A reservation store for hourly slots shared by a fixed set of accounts:
//! - 24 bookable slots per day, each owned by at most one account
//! - Single readers-writer lock over accounts and slot index
//! - Full JSON snapshot written atomically after every mutation
//! - Failed writes roll the in-memory change back
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Caller (HTTP façade, CLI, tests)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Arc<Store>
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                 │
//! │              RwLock<{ accounts, index }>                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Accounts   │◄────────►│  SlotIndex  │
//!   │  (ordered)  │  in step │ key → owner │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │  Snapshot   │
//!   │ (temp+mv)   │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use slotbook::{Day, ReservationKey, Store, StoreError};
//!
//! let store = Store::in_memory();
//! store.add_account("A", "secret").unwrap();
//! store.add_reservation("A", ReservationKey::new(2018, 7, 28, 2)).unwrap();
//!
//! let day = store.reservations_on_day(&Day::new(2018, 7, 28));
//! assert_eq!(day[2].as_deref(), Some("A"));
//!
//! let again = store.add_reservation("A", ReservationKey::new(2018, 7, 28, 2));
//! assert!(matches!(again, Err(StoreError::Conflict(_))));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod index;
pub mod persist;
pub mod password;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, SnapshotFormat};
pub use model::{Account, Day, ReservationKey};
pub use password::PasswordPolicy;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SlotBook
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
