//! Payment audit log
//!
//! This module provides the append-only stores for tuition and transport
//! payment records. Records capture how each payment landed on a ledger
//! (including the balance snapshot afterwards) and are never replayed:
//! amending a record later changes the audit trail only, never the
//! account it was applied to.
//!
//! # Duplicate Handling
//!
//! If a duplicate payment ID is encountered while loading, only the
//! first occurrence is stored. Subsequent records with the same ID are
//! ignored.

use crate::types::{
    BillingError, BusPaymentRecord, PaymentId, PaymentMethod, PaymentRecord, StudentId, TermId,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Append-only store of tuition payment records
///
/// Assigns sequential payment ids via [`PaymentLog::next_id`] and keeps
/// the counter ahead of any id appended, so records loaded from disk and
/// records created live never collide.
pub struct PaymentLog {
    /// Map of payment ID to record
    payments: HashMap<PaymentId, PaymentRecord>,

    /// Next id handed out by [`PaymentLog::next_id`]
    next_id: PaymentId,
}

impl PaymentLog {
    /// Create a new empty payment log
    pub fn new() -> Self {
        PaymentLog {
            payments: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id the next appended record should carry
    pub fn next_id(&self) -> PaymentId {
        self.next_id
    }

    /// Append a payment record
    ///
    /// If a record with the same ID already exists, the new record is
    /// ignored. The id counter stays ahead of every id seen.
    pub fn append(&mut self, record: PaymentRecord) {
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        self.payments.entry(record.id).or_insert(record);
    }

    /// Get an immutable reference to a record
    pub fn get(&self, payment: PaymentId) -> Option<&PaymentRecord> {
        self.payments.get(&payment)
    }

    /// Amend a record's amount, method or description
    ///
    /// Fields passed as `None` are left unchanged. This edits the audit
    /// trail only: the student's account is NOT recomputed from the new
    /// amount, and `balance_after` keeps its original snapshot.
    ///
    /// # Errors
    ///
    /// * `PaymentNotFound` if the id is unknown
    /// * `InvalidAmount` if a new amount is zero or negative; the record
    ///   is unchanged
    pub fn amend(
        &mut self,
        payment: PaymentId,
        amount: Option<Decimal>,
        method: Option<PaymentMethod>,
        description: Option<&str>,
    ) -> Result<&PaymentRecord, BillingError> {
        let record = self
            .payments
            .get_mut(&payment)
            .ok_or_else(|| BillingError::payment_not_found(payment))?;

        if let Some(new_amount) = amount {
            if new_amount <= Decimal::ZERO {
                return Err(BillingError::invalid_amount(record.student, new_amount));
            }
            record.amount = new_amount;
        }
        if let Some(new_method) = method {
            record.method = new_method;
        }
        if let Some(new_description) = description {
            record.description = new_description.to_string();
        }

        Ok(record)
    }

    /// All records for one student, oldest first
    pub fn for_student(&self, student: StudentId) -> Vec<&PaymentRecord> {
        let mut records: Vec<&PaymentRecord> = self
            .payments
            .values()
            .filter(|record| record.student == student)
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// All records for one student in one term, oldest first
    pub fn for_student_in_term(&self, student: StudentId, term: TermId) -> Vec<&PaymentRecord> {
        let mut records: Vec<&PaymentRecord> = self
            .payments
            .values()
            .filter(|record| record.student == student && record.term == term)
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// All records sorted by payment ID
    pub fn get_all(&self) -> Vec<&PaymentRecord> {
        let mut records: Vec<&PaymentRecord> = self.payments.values().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

impl Default for PaymentLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only store of transport payment records
///
/// Same shape as [`PaymentLog`] without amendment: bus payment records
/// are never edited after the fact.
pub struct BusPaymentLog {
    payments: HashMap<PaymentId, BusPaymentRecord>,
    next_id: PaymentId,
}

impl BusPaymentLog {
    /// Create a new empty bus payment log
    pub fn new() -> Self {
        BusPaymentLog {
            payments: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id the next appended record should carry
    pub fn next_id(&self) -> PaymentId {
        self.next_id
    }

    /// Append a bus payment record
    ///
    /// If a record with the same ID already exists, the new record is
    /// ignored.
    pub fn append(&mut self, record: BusPaymentRecord) {
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        self.payments.entry(record.id).or_insert(record);
    }

    /// Get an immutable reference to a record
    pub fn get(&self, payment: PaymentId) -> Option<&BusPaymentRecord> {
        self.payments.get(&payment)
    }

    /// All records for one student, oldest first
    pub fn for_student(&self, student: StudentId) -> Vec<&BusPaymentRecord> {
        let mut records: Vec<&BusPaymentRecord> = self
            .payments
            .values()
            .filter(|record| record.student == student)
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// All records sorted by payment ID
    pub fn get_all(&self) -> Vec<&BusPaymentRecord> {
        let mut records: Vec<&BusPaymentRecord> = self.payments.values().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

impl Default for BusPaymentLog {
    fn default() -> Self {
        Self::new()
    }
}
