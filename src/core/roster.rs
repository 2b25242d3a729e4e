//! Student roster module
//!
//! This module provides the `Roster` struct which maintains the state of
//! all student accounts and provides lookup and registration operations.
//!
//! The Roster is responsible for:
//! - Assigning student ids at registration
//! - Enforcing admission number uniqueness
//! - Providing sorted account listings for output
//!
//! Ledger arithmetic lives on the account types; the roster only stores
//! and finds them.

use crate::types::{BillingError, Grade, StudentAccount, StudentId};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Manages all student accounts
///
/// The Roster maintains an in-memory map of student IDs to accounts. It
/// provides methods for registration, lookup, and retrieving all accounts
/// for statement generation.
pub struct Roster {
    /// Map of student IDs to accounts
    accounts: HashMap<StudentId, StudentAccount>,

    /// Next id handed out by [`Roster::register`]
    next_id: StudentId,
}

impl Roster {
    /// Create a new Roster with no students
    pub fn new() -> Self {
        Roster {
            accounts: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id the next registration will be assigned
    pub fn next_id(&self) -> StudentId {
        self.next_id
    }

    /// Register a new student and hand back the created account
    ///
    /// Assigns the next free student id. The account starts with zeroed
    /// ledgers except for opening `arrears`, letting transfers-in carry
    /// debt from their previous school.
    ///
    /// # Arguments
    ///
    /// * `name` - Full name
    /// * `admission_no` - Admission number, must be unique
    /// * `grade` - Starting grade tier
    /// * `phone` - Guardian phone number (may be empty)
    /// * `boarding` - Whether the student boards
    /// * `arrears` - Opening tuition arrears, zero for most students
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAdmission` if the admission number is already
    /// registered; the roster is unchanged.
    pub fn register(
        &mut self,
        name: &str,
        admission_no: &str,
        grade: Grade,
        phone: &str,
        boarding: bool,
        arrears: Decimal,
    ) -> Result<&StudentAccount, BillingError> {
        if self
            .accounts
            .values()
            .any(|account| account.admission_no == admission_no)
        {
            return Err(BillingError::duplicate_admission(admission_no));
        }

        let id = self.next_id;
        self.next_id += 1;

        let mut account = StudentAccount::new(id, name, admission_no, grade);
        account.phone = phone.to_string();
        account.boarding = boarding;
        account.tuition.arrears = arrears;

        Ok(self.accounts.entry(id).or_insert(account))
    }

    /// Insert an account loaded from storage
    ///
    /// Used when reading the roster back from disk, where ids already
    /// exist. Keeps the registration counter ahead of every loaded id.
    ///
    /// # Errors
    ///
    /// * `DuplicateStudent` if the id is already present
    /// * `DuplicateAdmission` if the admission number is already present
    pub fn insert(&mut self, account: StudentAccount) -> Result<(), BillingError> {
        if self.accounts.contains_key(&account.id) {
            return Err(BillingError::DuplicateStudent {
                student: account.id,
            });
        }
        if self
            .accounts
            .values()
            .any(|existing| existing.admission_no == account.admission_no)
        {
            return Err(BillingError::duplicate_admission(&account.admission_no));
        }

        self.next_id = self.next_id.max(account.id + 1);
        self.accounts.insert(account.id, account);
        Ok(())
    }

    /// Look up a student by id
    ///
    /// # Errors
    ///
    /// Returns `StudentNotFound` if no account exists for the id.
    pub fn get(&self, student: StudentId) -> Result<&StudentAccount, BillingError> {
        self.accounts
            .get(&student)
            .ok_or_else(|| BillingError::student_not_found(student))
    }

    /// Look up a student by id for mutation
    ///
    /// # Errors
    ///
    /// Returns `StudentNotFound` if no account exists for the id.
    pub fn get_mut(&mut self, student: StudentId) -> Result<&mut StudentAccount, BillingError> {
        self.accounts
            .get_mut(&student)
            .ok_or_else(|| BillingError::student_not_found(student))
    }

    /// Get all accounts sorted by student ID
    ///
    /// Returns a vector of references to all accounts, sorted by student
    /// ID in ascending order. This provides deterministic output for CSV
    /// generation.
    pub fn get_all(&self) -> Vec<&StudentAccount> {
        let mut accounts: Vec<&StudentAccount> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Iterate over all accounts mutably, in unspecified order
    ///
    /// Batch operations (rollover, promotion) use this to touch every
    /// student exactly once.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StudentAccount> {
        self.accounts.values_mut()
    }

    /// Number of registered students
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the roster has no students
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}
