//! Index Module
//!
//! Secondary lookup from a reserved slot to the account that owns it.
//!
//! ## Responsibilities
//! - O(1) conflict detection when booking
//! - O(1) per-slot lookup for day views
//! - Rebuilt from account lists on load, never persisted itself
//!
//! ## Concurrency
//! The index has no lock of its own. It lives inside the store state and is
//! guarded by the same `RwLock` as the account lists, so the two can never be
//! observed out of step.

mod slot_index;

pub use slot_index::SlotIndex;
