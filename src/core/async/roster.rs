//! Thread-safe student account map for concurrent day-file import
//!
//! This module provides the `AsyncRoster` struct, which holds student account
//! states in a concurrent data structure so payment events can be settled
//! from multiple tasks at once.
//!
//! # Design
//!
//! The `AsyncRoster` uses `DashMap` (a concurrent HashMap) to provide
//! thread-safe account storage with fine-grained locking. This allows
//! multiple threads to safely settle payments for different students
//! concurrently while keeping operations on the same student serialized.
//!
//! Unlike the synchronous `Roster`, the async map never creates accounts on
//! demand: it is seeded from the loaded roster before an import starts, and
//! events naming an unknown student are rejected. Enrollment happens through
//! the synchronous engine, not through day files.
//!
//! # Thread Safety
//!
//! All operations are thread-safe and prevent data races through DashMap's
//! internal synchronization. The Rust type system ensures that shared
//! references cannot be used to mutate state, and mutable operations are
//! properly synchronized.

use crate::types::{BillingError, StudentAccount, StudentId};
use dashmap::DashMap;

/// Thread-safe account map for concurrent payment settlement
///
/// `AsyncRoster` provides concurrent access to student accounts using
/// `DashMap` for fine-grained locking. Multiple threads can safely settle
/// payments for different students simultaneously, while operations on the
/// same student are automatically serialized.
///
/// # Thread Safety
///
/// All methods are safe to call from multiple threads concurrently. The
/// internal `DashMap` ensures that:
/// - Concurrent reads of different accounts don't block each other
/// - Concurrent writes to different accounts don't block each other
/// - Operations on the same account are properly synchronized
///
/// # Performance
///
/// For multi-threaded workloads touching many different students,
/// `AsyncRoster` scales well. For single-threaded workloads, or day files
/// dominated by one student, the synchronous `Roster` is more efficient.
#[derive(Debug)]
pub struct AsyncRoster {
    /// Concurrent HashMap storing account states by student ID
    ///
    /// DashMap provides fine-grained locking through internal sharding,
    /// allowing concurrent access to different accounts without global locks.
    accounts: DashMap<StudentId, StudentAccount>,
}

impl AsyncRoster {
    /// Create a new empty AsyncRoster
    ///
    /// # Returns
    ///
    /// A new `AsyncRoster` with no accounts. Use
    /// [`AsyncRoster::from_accounts`] to seed it with the loaded roster
    /// before processing a day file.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Seed the map from already-loaded accounts
    ///
    /// Day-file import starts from the roster the synchronous engine holds;
    /// this constructor takes a snapshot of those accounts. Events for
    /// students not present in the snapshot will fail with
    /// `StudentNotFound` rather than conjuring an account.
    ///
    /// # Arguments
    ///
    /// * `accounts` - Account snapshots to settle payments against
    pub fn from_accounts(accounts: Vec<StudentAccount>) -> Self {
        let map = DashMap::with_capacity(accounts.len());
        for account in accounts {
            map.insert(account.id, account);
        }
        Self { accounts: map }
    }

    /// Get a snapshot of one student's account
    ///
    /// # Arguments
    ///
    /// * `student` - The student ID to look up
    ///
    /// # Returns
    ///
    /// A clone of the account, or `None` if the student is not in the map.
    /// The clone is a snapshot at the time of the call; concurrent
    /// modifications by other threads won't be reflected in it.
    pub fn get(&self, student: StudentId) -> Option<StudentAccount> {
        self.accounts.get(&student).map(|entry| entry.clone())
    }

    /// Update an account using a closure
    ///
    /// This method provides atomic access to an account for modification.
    /// The closure receives a mutable reference to the account and can
    /// modify it. The entry is locked during the closure execution, ensuring
    /// no other thread can modify the same account concurrently.
    ///
    /// The closure's success value is handed back to the caller, which lets
    /// payment settlement snapshot the post-payment balance while the entry
    /// lock is still held.
    ///
    /// # Arguments
    ///
    /// * `student` - The student ID of the account to update
    /// * `f` - A closure that receives a mutable reference to the account
    ///   and returns a Result carrying a value out of the critical section
    ///
    /// # Returns
    ///
    /// * `Ok(value)` if the closure executed successfully
    /// * `Err(BillingError::StudentNotFound)` if the student is not in the
    ///   map; the closure never runs in that case
    /// * `Err(BillingError)` if the closure returned an error
    ///
    /// # Thread Safety
    ///
    /// The closure is executed while holding a lock on the account entry.
    /// This ensures that modifications are atomic and no other thread can
    /// observe a partially-updated account state.
    pub fn update<T, F>(&self, student: StudentId, f: F) -> Result<T, BillingError>
    where
        F: FnOnce(&mut StudentAccount) -> Result<T, BillingError>,
    {
        let mut entry = self
            .accounts
            .get_mut(&student)
            .ok_or_else(|| BillingError::student_not_found(student))?;
        f(entry.value_mut())
    }

    /// Get all accounts for write-back into the synchronous engine
    ///
    /// This method returns a vector containing clones of all accounts
    /// currently held in the map, in an arbitrary order (determined by the
    /// internal hash map).
    ///
    /// # Returns
    ///
    /// A vector of all accounts. The vector will be empty if the map was
    /// never seeded.
    ///
    /// # Thread Safety
    ///
    /// This method is thread-safe and can be called concurrently. However,
    /// the returned vector is a snapshot at the time of the call; accounts
    /// may be modified by other threads after this method returns.
    pub fn all_accounts(&self) -> Vec<StudentAccount> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for AsyncRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Grade;
    use rust_decimal::Decimal;

    fn account(id: StudentId, balance: i64, arrears: i64) -> StudentAccount {
        let mut account =
            StudentAccount::new(id, "Njeri Wairimu", &format!("ADM-{id:03}"), Grade::Grade4);
        account.tuition.balance = Decimal::new(balance, 0);
        account.tuition.arrears = Decimal::new(arrears, 0);
        account
    }

    #[test]
    fn test_from_accounts_seeds_the_map() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0), account(2, 2000, 300)]);

        assert_eq!(roster.accounts.len(), 2);

        let first = roster.get(1).unwrap();
        assert_eq!(first.tuition.balance, Decimal::new(1500, 0));

        let second = roster.get(2).unwrap();
        assert_eq!(second.tuition.arrears, Decimal::new(300, 0));
    }

    #[test]
    fn test_new_starts_empty() {
        let roster = AsyncRoster::new();

        assert!(roster.all_accounts().is_empty());
    }

    #[test]
    fn test_get_unknown_student_returns_none() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        assert!(roster.get(99).is_none());
    }

    #[test]
    fn test_get_returns_a_snapshot() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        let snapshot = roster.get(1).unwrap();
        roster
            .update(1, |account| {
                account.receive_payment(Decimal::new(500, 0))?;
                Ok(())
            })
            .unwrap();

        // The earlier clone does not see the later payment.
        assert_eq!(snapshot.tuition.balance, Decimal::new(1500, 0));
        assert_eq!(
            roster.get(1).unwrap().tuition.balance,
            Decimal::new(1000, 0)
        );
    }

    #[test]
    fn test_update_modifies_existing_account() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        let result = roster.update(1, |account| {
            account.receive_payment(Decimal::new(400, 0))?;
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(
            roster.get(1).unwrap().tuition.balance,
            Decimal::new(1100, 0)
        );
    }

    #[test]
    fn test_update_returns_the_closure_value() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        let balance_after = roster
            .update(1, |account| {
                account.receive_payment(Decimal::new(600, 0))?;
                Ok(account.tuition.balance)
            })
            .unwrap();

        assert_eq!(balance_after, Decimal::new(900, 0));
    }

    #[test]
    fn test_update_unknown_student_does_not_create_an_account() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        let result = roster.update(7, |account| {
            account.receive_payment(Decimal::new(100, 0))?;
            Ok(())
        });

        assert_eq!(result.unwrap_err(), BillingError::student_not_found(7));
        assert_eq!(roster.accounts.len(), 1);
        assert!(roster.get(7).is_none());
    }

    #[test]
    fn test_update_returns_error_from_closure() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 0)]);

        let result: Result<(), BillingError> =
            roster.update(1, |_account| Err(BillingError::no_destination_assigned(1)));

        assert_eq!(
            result.unwrap_err(),
            BillingError::no_destination_assigned(1)
        );
    }

    #[test]
    fn test_failed_payment_leaves_account_unchanged() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 200)]);

        let result = roster.update(1, |account| {
            account.receive_payment(Decimal::new(-50, 0))?;
            Ok(())
        });

        assert!(result.is_err());
        let after = roster.get(1).unwrap();
        assert_eq!(after.tuition.balance, Decimal::new(1500, 0));
        assert_eq!(after.tuition.arrears, Decimal::new(200, 0));
    }

    #[test]
    fn test_multiple_updates_on_same_account() {
        let roster = AsyncRoster::from_accounts(vec![account(1, 1500, 500)]);

        roster
            .update(1, |account| {
                account.receive_payment(Decimal::new(500, 0))?;
                Ok(())
            })
            .unwrap();
        roster
            .update(1, |account| {
                account.receive_payment(Decimal::new(700, 0))?;
                Ok(())
            })
            .unwrap();

        let after = roster.get(1).unwrap();
        assert_eq!(after.tuition.arrears, Decimal::ZERO);
        assert_eq!(after.tuition.balance, Decimal::new(800, 0));
    }

    #[test]
    fn test_all_accounts_returns_every_account() {
        let roster = AsyncRoster::from_accounts(vec![
            account(1, 1500, 0),
            account(2, 2000, 0),
            account(3, 1200, 0),
        ]);

        let accounts = roster.all_accounts();

        assert_eq!(accounts.len(), 3);
        let ids: Vec<StudentId> = accounts.iter().map(|a| a.id).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(ids.contains(&3));
    }

    // Concurrent access tests
    // These verify that AsyncRoster is thread-safe and keeps ledger
    // invariants intact under concurrent settlement.
    #[test]
    fn test_concurrent_updates_different_students() {
        use std::sync::Arc;
        use std::thread;

        let accounts = (0u32..10).map(|i| account(i, 1000, 0)).collect();
        let roster = Arc::new(AsyncRoster::from_accounts(accounts));
        let mut handles = vec![];

        // Each thread pays a different student's account down.
        for i in 0u32..10 {
            let roster_clone = Arc::clone(&roster);
            let handle = thread::spawn(move || {
                let amount = Decimal::new(((i + 1) * 100) as i64, 0);
                roster_clone
                    .update(i, |account| {
                        account.receive_payment(amount)?;
                        Ok(())
                    })
                    .unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0u32..10 {
            let after = roster.get(i).unwrap();
            let expected = Decimal::new(1000 - ((i as i64 + 1) * 100), 0);
            assert_eq!(after.tuition.balance, expected);
        }
    }

    #[test]
    fn test_concurrent_updates_same_student() {
        use std::sync::Arc;
        use std::thread;

        let roster = Arc::new(AsyncRoster::from_accounts(vec![account(1, 10_000, 0)]));
        let mut handles = vec![];

        // 100 threads each pay 100 against a balance of 10000.
        for _ in 0..100 {
            let roster_clone = Arc::clone(&roster);
            let handle = thread::spawn(move || {
                roster_clone
                    .update(1, |account| {
                        account.receive_payment(Decimal::new(100, 0))?;
                        Ok(())
                    })
                    .unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let after = roster.get(1).unwrap();
        assert_eq!(after.tuition.balance, Decimal::ZERO);
        assert_eq!(after.tuition.prepayment, Decimal::ZERO);
    }

    #[test]
    fn test_concurrent_mixed_operations() {
        use std::sync::Arc;
        use std::thread;

        let accounts = (0u32..5).map(|i| account(i, 2000, 300)).collect();
        let roster = Arc::new(AsyncRoster::from_accounts(accounts));
        let mut handles = vec![];

        // Interleave reads, payments and whole-map snapshots.
        for i in 0..20 {
            let roster_clone = Arc::clone(&roster);
            let handle = thread::spawn(move || {
                let student = (i % 5) as StudentId;

                match i % 3 {
                    0 => {
                        let snapshot = roster_clone.get(student).unwrap();
                        assert_eq!(snapshot.id, student);
                    }
                    1 => {
                        roster_clone
                            .update(student, |account| {
                                account.receive_payment(Decimal::new(100, 0))?;
                                Ok(())
                            })
                            .unwrap();
                    }
                    2 => {
                        let all = roster_clone.all_accounts();
                        assert_eq!(all.len(), 5);
                    }
                    _ => unreachable!(),
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // Ledger invariant: arrears and prepayment never both positive.
        for after in roster.all_accounts() {
            assert!(after.tuition.balance >= Decimal::ZERO);
            assert!(after.tuition.arrears >= Decimal::ZERO);
            assert!(
                !(after.tuition.arrears > Decimal::ZERO
                    && after.tuition.prepayment > Decimal::ZERO)
            );
        }
    }
}
