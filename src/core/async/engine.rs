//! Payment settlement orchestration for concurrent day-file import
//!
//! This module provides the `AsyncBillingEngine` struct, which settles
//! payment events against the thread-safe `AsyncRoster`.
//!
//! # Design
//!
//! The `AsyncBillingEngine` applies both event kinds (fee payments and bus
//! payments) to the shared account map and reports each settlement as an
//! [`AppliedPayment`]. It does not touch the audit logs: log records carry
//! sequential ids, and assigning those concurrently would impose a global
//! order the import deliberately avoids. The synchronous engine writes the
//! collected settlements back in one pass after the batch run finishes.
//!
//! # Architecture
//!
//! ```text
//! AsyncBillingEngine
//!     └── Arc<AsyncRoster>  (thread-safe account states)
//! ```
//!
//! # Thread Safety
//!
//! The engine itself is cloneable (via Clone trait) and can be safely shared
//! across multiple async tasks. All internal state is behind Arc, and the
//! underlying roster uses DashMap for thread-safe concurrent access.
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::types::{AppliedPayment, BillingError, PaymentEvent, PaymentMethod, StudentId};

use super::AsyncRoster;

/// Payment settlement orchestrator for concurrent day-file import
///
/// `AsyncBillingEngine` settles payment events against the thread-safe
/// roster map. It can be cloned and shared across multiple async tasks for
/// concurrent processing.
///
/// # Thread Safety
///
/// The engine is safe to clone and use from multiple threads/tasks
/// concurrently. All account mutations are synchronized through the
/// underlying DashMap in AsyncRoster.
#[derive(Debug, Clone)]
pub struct AsyncBillingEngine {
    /// Thread-safe student account map
    ///
    /// Wrapped in Arc to enable sharing across async tasks. The AsyncRoster
    /// uses DashMap internally for fine-grained locking per student.
    roster: Arc<AsyncRoster>,
}

impl AsyncBillingEngine {
    /// Create a new AsyncBillingEngine
    ///
    /// # Arguments
    ///
    /// * `roster` - Arc-wrapped AsyncRoster seeded with the accounts to
    ///   settle against
    ///
    /// # Returns
    ///
    /// A new `AsyncBillingEngine` that can be cloned and shared across
    /// async tasks.
    pub fn new(roster: Arc<AsyncRoster>) -> Self {
        Self { roster }
    }

    /// Settle a tuition payment against a student's account
    ///
    /// The amount is applied oldest debt first: arrears before the current
    /// balance, with any excess held as prepayment. The post-payment tuition
    /// balance is snapshotted while the account entry is still locked, so
    /// the reported figure is exact even under concurrent settlement.
    ///
    /// # Arguments
    ///
    /// * `student` - The paying student
    /// * `amount` - Payment amount, must be strictly positive
    /// * `method` - How the money arrived
    /// * `reference` - Receipt or statement reference for the audit record
    ///
    /// # Returns
    ///
    /// * `Ok(AppliedPayment::Fee)` - The settlement, ready for log write-back
    /// * `Err(BillingError::StudentNotFound)` - If the student is not on the roster
    /// * `Err(BillingError::InvalidAmount)` - If the amount is not positive
    pub fn apply_fee_payment(
        &self,
        student: StudentId,
        amount: Decimal,
        method: PaymentMethod,
        reference: String,
    ) -> Result<AppliedPayment, BillingError> {
        let balance_after = self.roster.update(student, |account| {
            account.receive_payment(amount)?;
            Ok(account.tuition.balance)
        })?;

        Ok(AppliedPayment::Fee {
            student,
            amount,
            method,
            reference,
            balance_after,
        })
    }

    /// Settle a transport payment against a student's account
    ///
    /// The destination check happens inside the account's critical section:
    /// a student with no assigned destination cannot accept bus money, and
    /// the settlement records which destination the payment was for.
    ///
    /// # Arguments
    ///
    /// * `student` - The paying student
    /// * `amount` - Payment amount, must be strictly positive
    ///
    /// # Returns
    ///
    /// * `Ok(AppliedPayment::Bus)` - The settlement, ready for log write-back
    /// * `Err(BillingError::StudentNotFound)` - If the student is not on the roster
    /// * `Err(BillingError::NoDestinationAssigned)` - If the student has no bus destination
    /// * `Err(BillingError::InvalidAmount)` - If the amount is not positive
    pub fn apply_bus_payment(
        &self,
        student: StudentId,
        amount: Decimal,
    ) -> Result<AppliedPayment, BillingError> {
        let (destination, balance_after) = self.roster.update(student, |account| {
            let destination = account
                .destination
                .ok_or_else(|| BillingError::no_destination_assigned(student))?;
            account.receive_bus_payment(amount)?;
            Ok((destination, account.transport.balance))
        })?;

        Ok(AppliedPayment::Bus {
            student,
            amount,
            destination,
            balance_after,
        })
    }

    /// Settle one day-file event by routing to the appropriate handler
    ///
    /// This is the main entry point for the batch processor. Fee events go
    /// to the tuition ledger, bus events to the transport ledger; the two
    /// never mix.
    ///
    /// # Arguments
    ///
    /// * `event` - The payment event to settle
    ///
    /// # Returns
    ///
    /// * `Ok(AppliedPayment)` - If the event settled successfully
    /// * `Err(...)` - Errors from the specific settlement handlers
    pub fn apply(&self, event: PaymentEvent) -> Result<AppliedPayment, BillingError> {
        match event {
            PaymentEvent::Fee {
                student,
                amount,
                method,
                reference,
            } => self.apply_fee_payment(student, amount, method, reference),
            PaymentEvent::Bus { student, amount } => self.apply_bus_payment(student, amount),
        }
    }
}
