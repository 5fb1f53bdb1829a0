//! Tests for Store
//!
//! These tests verify:
//! - Account management (add / remove / sort / password)
//! - Reservation booking, cancellation and conflict handling
//! - Range validation leaving the store unchanged
//! - Day queries and the past-reservation sweep
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use slotbook::model::{Day, ReservationKey, SLOTS_PER_DAY};
use slotbook::{Store, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn key(year: i32, month: i32, day: i32, slot: i32) -> ReservationKey {
    ReservationKey::new(year, month, day, slot)
}

fn store_with(names: &[&str]) -> Store {
    let store = Store::in_memory();
    for name in names {
        store.add_account(name, "password").unwrap();
    }
    store
}

fn assert_index_consistent(store: &Store) {
    let mut listed = 0;
    for account in store.accounts() {
        for k in &account.reservations {
            assert_eq!(store.owner_of(k).as_deref(), Some(account.name.as_str()));
            listed += 1;
        }
    }
    assert_eq!(listed, store.reservation_count());
}

// =============================================================================
// Account Tests
// =============================================================================

#[test]
fn test_add_account() {
    let store = store_with(&["101"]);
    assert_eq!(store.account_names(), vec!["101"]);
    assert!(store.reservations_of("101").unwrap().is_empty());
}

#[test]
fn test_add_duplicate_account_fails() {
    let store = store_with(&["101"]);
    let result = store.add_account("101", "other");

    assert!(matches!(result, Err(StoreError::DuplicateName(_))));
    assert_eq!(store.account_count(), 1);
    assert_eq!(store.password_of("101").unwrap(), "password");
}

#[test]
fn test_ensure_account() {
    let store = store_with(&["admin"]);
    assert!(!store.ensure_account("admin", "changed").unwrap());
    assert!(store.ensure_account("101", "pw").unwrap());
    assert_eq!(store.password_of("admin").unwrap(), "password");
}

#[test]
fn test_remove_account_releases_slots() {
    let store = store_with(&["101", "102"]);
    store.add_reservation("101", key(2018, 7, 28, 1)).unwrap();
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();
    store.add_reservation("102", key(2018, 7, 28, 3)).unwrap();

    store.remove_account("101").unwrap();

    assert_eq!(store.account_names(), vec!["102"]);
    assert_eq!(store.owner_of(&key(2018, 7, 28, 1)), None);
    assert_eq!(store.owner_of(&key(2018, 7, 28, 3)).as_deref(), Some("102"));
    // Released slot can be booked again
    store.add_reservation("102", key(2018, 7, 28, 1)).unwrap();
    assert_index_consistent(&store);
}

#[test]
fn test_remove_missing_account_fails() {
    let store = store_with(&["101"]);
    assert!(matches!(store.remove_account("999"), Err(StoreError::NotFound(_))));
    assert_eq!(store.account_count(), 1);
}

#[test]
fn test_sort_by_name() {
    let store = store_with(&["b", "admin", "102", "101"]);
    store.sort_by_name().unwrap();
    assert_eq!(store.account_names(), vec!["101", "102", "admin", "b"]);
}

#[test]
fn test_insertion_order_kept_until_sorted() {
    let store = store_with(&["c", "a", "b"]);
    assert_eq!(store.account_names(), vec!["c", "a", "b"]);
}

#[test]
fn test_set_password() {
    let store = store_with(&["101"]);
    store.set_password("101", "password", "newpass").unwrap();
    assert_eq!(store.password_of("101").unwrap(), "newpass");
}

#[test]
fn test_set_password_wrong_old_password() {
    let store = store_with(&["101"]);
    let result = store.set_password("101", "Password", "newpass");

    assert!(matches!(result, Err(StoreError::WrongPassword(_))));
    assert_eq!(store.password_of("101").unwrap(), "password");
}

#[test]
fn test_set_password_missing_account() {
    let store = store_with(&["101"]);
    let result = store.set_password("999", "password", "newpass");
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_password_of_missing_account() {
    let store = Store::in_memory();
    assert!(matches!(store.password_of("101"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_verify_password() {
    let store = store_with(&["101"]);
    store.verify_password("101", "password").unwrap();
    assert!(matches!(
        store.verify_password("101", "nope"),
        Err(StoreError::WrongPassword(_))
    ));
    assert!(matches!(
        store.verify_password("999", "password"),
        Err(StoreError::NotFound(_))
    ));
}

// =============================================================================
// Reservation Tests
// =============================================================================

#[test]
fn test_add_reservation() {
    let store = store_with(&["101"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();

    assert_eq!(store.reservations_of("101").unwrap(), vec![key(2018, 7, 28, 2)]);
    assert_eq!(store.owner_of(&key(2018, 7, 28, 2)).as_deref(), Some("101"));
}

#[test]
fn test_add_reservation_conflict_with_other_account() {
    let store = store_with(&["101", "102"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();

    let result = store.add_reservation("102", key(2018, 7, 28, 2));

    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert!(store.reservations_of("102").unwrap().is_empty());
}

#[test]
fn test_rebooking_own_slot_is_conflict() {
    let store = store_with(&["101"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();

    let result = store.add_reservation("101", key(2018, 7, 28, 2));

    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert_eq!(store.reservations_of("101").unwrap().len(), 1);
}

#[test]
fn test_add_reservation_unknown_account() {
    let store = store_with(&["101"]);
    let result = store.add_reservation("999", key(2018, 7, 28, 2));

    assert!(matches!(result, Err(StoreError::NoSuchAccount(_))));
    assert_eq!(store.reservation_count(), 0);
}

#[test]
fn test_invalid_keys_rejected_and_store_unchanged() {
    let store = store_with(&["101"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();
    let before = store.accounts();

    for bad in [
        key(2016, 1, 1, 0),
        key(2018, 13, 1, 0),
        key(2018, 1, 32, 0),
        key(2018, 1, 1, 24),
    ] {
        let result = store.add_reservation("101", bad);
        assert!(matches!(result, Err(StoreError::InvalidKey(k)) if k == bad));
    }

    assert_eq!(store.accounts(), before);
    assert_eq!(store.reservation_count(), 1);
}

#[test]
fn test_calendar_impossible_day_is_accepted() {
    let store = store_with(&["101"]);
    store.add_reservation("101", key(2018, 2, 31, 0)).unwrap();
    assert_eq!(store.owner_of(&key(2018, 2, 31, 0)).as_deref(), Some("101"));
}

#[test]
fn test_remove_reservation() {
    let store = store_with(&["101"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();
    store.add_reservation("101", key(2018, 7, 28, 3)).unwrap();

    store.remove_reservation("101", &key(2018, 7, 28, 2)).unwrap();

    assert_eq!(store.reservations_of("101").unwrap(), vec![key(2018, 7, 28, 3)]);
    assert_eq!(store.owner_of(&key(2018, 7, 28, 2)), None);
    assert_index_consistent(&store);
}

#[test]
fn test_remove_reservation_of_other_account_fails() {
    let store = store_with(&["101", "102"]);
    store.add_reservation("101", key(2018, 7, 28, 2)).unwrap();

    let result = store.remove_reservation("102", &key(2018, 7, 28, 2));

    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert_eq!(store.owner_of(&key(2018, 7, 28, 2)).as_deref(), Some("101"));
}

#[test]
fn test_remove_reservation_missing_account_or_key() {
    let store = store_with(&["101"]);
    assert!(matches!(
        store.remove_reservation("999", &key(2018, 7, 28, 2)),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.remove_reservation("101", &key(2018, 7, 28, 2)),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_clear_all_reservations() {
    let store = store_with(&["101", "102"]);
    store.add_reservation("101", key(2018, 7, 28, 1)).unwrap();
    store.add_reservation("102", key(2018, 7, 28, 2)).unwrap();

    assert_eq!(store.clear_all_reservations().unwrap(), 2);

    assert_eq!(store.reservation_count(), 0);
    assert!(store.accounts().iter().all(|a| a.reservations.is_empty()));
    assert_eq!(store.account_count(), 2);
    // Cleared slots are free again
    store.add_reservation("102", key(2018, 7, 28, 1)).unwrap();
}

// =============================================================================
// Sweep Tests
// =============================================================================

#[test]
fn test_sweep_boundary() {
    let store = store_with(&["101"]);
    let yesterday = key(2018, 7, 27, 23);
    let today = key(2018, 7, 28, 0);
    let tomorrow = key(2018, 7, 29, 5);
    for k in [yesterday, today, tomorrow] {
        store.add_reservation("101", k).unwrap();
    }

    let removed = store.remove_reservations_before(Day::new(2018, 7, 28)).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.reservations_of("101").unwrap(), vec![today, tomorrow]);
    assert_eq!(store.owner_of(&yesterday), None);
    assert_index_consistent(&store);
}

#[test]
fn test_sweep_compares_month_and_year() {
    let store = store_with(&["101", "102"]);
    store.add_reservation("101", key(2017, 12, 31, 0)).unwrap();
    store.add_reservation("101", key(2018, 6, 30, 0)).unwrap();
    store.add_reservation("102", key(2018, 8, 1, 0)).unwrap();
    store.add_reservation("102", key(2019, 1, 1, 0)).unwrap();

    store.remove_reservations_before(Day::new(2018, 7, 28)).unwrap();

    assert!(store.reservations_of("101").unwrap().is_empty());
    assert_eq!(store.reservations_of("102").unwrap().len(), 2);
}

#[test]
fn test_sweep_relative_to_today() {
    let store = store_with(&["101"]);
    let yesterday = Day::in_days(-1).unwrap();
    let today = Day::today();
    let tomorrow = Day::in_days(1).unwrap();
    for day in [yesterday, today, tomorrow] {
        store.add_reservation("101", day.key(12)).unwrap();
    }

    assert_eq!(store.remove_past_reservations().unwrap(), 1);
    assert_eq!(
        store.reservations_of("101").unwrap(),
        vec![today.key(12), tomorrow.key(12)]
    );
}

// =============================================================================
// Day Query Tests
// =============================================================================

#[test]
fn test_reservations_on_day() {
    let store = store_with(&["A"]);
    store.add_reservation("A", key(2018, 7, 28, 2)).unwrap();

    let day = store.reservations_on_day(&Day::new(2018, 7, 28));
    assert_eq!(day.len(), SLOTS_PER_DAY);
    for (slot, owner) in day.iter().enumerate() {
        if slot == 2 {
            assert_eq!(owner.as_deref(), Some("A"));
        } else {
            assert_eq!(*owner, None);
        }
    }

    let next = store.reservations_on_day(&Day::new(2018, 7, 29));
    assert!(next.iter().all(Option::is_none));
}

#[test]
fn test_reservations_on_day_multiple_owners() {
    let store = store_with(&["A", "B"]);
    store.add_reservation("A", key(2018, 7, 28, 0)).unwrap();
    store.add_reservation("B", key(2018, 7, 28, 23)).unwrap();

    let day = store.reservations_on_day(&Day::new(2018, 7, 28));
    assert_eq!(day[0].as_deref(), Some("A"));
    assert_eq!(day[23].as_deref(), Some("B"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_distinct_slots_same_account() {
    let store = Arc::new(store_with(&["101"]));

    let handles: Vec<_> = (0..SLOTS_PER_DAY as i32)
        .map(|slot| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add_reservation("101", key(2018, 7, 28, slot)))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(store.reservations_of("101").unwrap().len(), SLOTS_PER_DAY);
    assert_index_consistent(&store);
}

#[test]
fn test_concurrent_same_slot_single_winner() {
    let names: Vec<String> = (0..16).map(|i| format!("{}", 100 + i)).collect();
    let store = Arc::new(Store::in_memory());
    for name in &names {
        store.add_account(name, "pw").unwrap();
    }

    let handles: Vec<_> = names
        .iter()
        .cloned()
        .map(|name| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add_reservation(&name, key(2018, 7, 28, 9)))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::Conflict(_))))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(conflicts, names.len() - 1);
    assert_eq!(store.reservation_count(), 1);
    assert_index_consistent(&store);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let store = Arc::new(store_with(&["A", "B", "C", "D"]));
    let mut handles = Vec::new();

    for (t, name) in ["A", "B", "C", "D"].into_iter().enumerate() {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for day in 1..=10 {
                let k = key(2018, 7, day, t as i32);
                store.add_reservation(name, k).unwrap();
                if day % 2 == 0 {
                    store.remove_reservation(name, &k).unwrap();
                }
            }
        }));
    }

    for _ in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for day in 1..=10 {
                let view = store.reservations_on_day(&Day::new(2018, 7, day));
                assert_eq!(view.len(), SLOTS_PER_DAY);
                assert!(store.password_of("A").is_ok());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.reservation_count(), 4 * 5);
    assert_index_consistent(&store);
}
