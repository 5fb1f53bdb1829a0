//! Model Module
//!
//! Value types shared by every other layer.
//!
//! ## Types
//! - [`ReservationKey`]: one bookable hour `(year, month, day, slot)`
//! - [`Day`]: the date part of a key, ordered `(year, month, day)`
//! - [`Account`]: a named account and the keys it holds
//!
//! ## Validity
//! Keys are range checked only: `year >= 2017`, month `1..=12`, day `1..=31`,
//! slot `0..=23`. Day-of-month is never checked against the calendar, so
//! `31.2.2018` is a valid key.

mod account;
mod key;

pub use account::Account;
pub use key::{Day, ReservationKey, MIN_YEAR, SLOTS_PER_DAY};
