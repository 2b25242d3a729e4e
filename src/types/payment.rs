//! Payment types for the school billing engine
//!
//! This module defines the immutable audit records written whenever money
//! moves on a ledger, and the day-file events consumed by bulk import.
//! Records are append-only: amending one later never replays it against
//! the account.

use super::account::{DestinationId, StudentId};
use super::error::BillingError;
use super::term::TermId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Payment identifier, assigned sequentially by the payment log
///
/// Supports payment IDs from 0 to 4,294,967,295
pub type PaymentId = u32;

/// How a tuition payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    /// Mobile money transfer
    Mpesa,
    /// Bank deposit or transfer
    Bank,
    Cheque,
}

impl PaymentMethod {
    /// Short form used in CSV files and display output
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    /// Parse the short form, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns `BillingError::UnknownMethod` for anything outside the
    /// accepted set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "bank" => Ok(PaymentMethod::Bank),
            "cheque" => Ok(PaymentMethod::Cheque),
            other => Err(BillingError::unknown_method(other)),
        }
    }
}

/// Immutable record of one tuition payment
///
/// Captures the ledger outcome at the moment the payment was applied:
/// `balance_after` is the tuition balance once arrears-first settlement
/// finished. The account is never recomputed from these records.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    /// The payment ID, unique within the log
    pub id: PaymentId,

    /// Student the payment was applied to
    pub student: StudentId,

    /// Term the payment was recorded against
    pub term: TermId,

    /// Amount paid (always positive)
    pub amount: Decimal,

    /// How the payment was made
    pub method: PaymentMethod,

    /// Day the payment was applied
    pub date: NaiveDate,

    /// Free-text note, e.g. a receipt or transaction reference
    pub description: String,

    /// Tuition balance immediately after this payment settled
    pub balance_after: Decimal,
}

/// Immutable record of one transport payment
#[derive(Debug, Clone, PartialEq)]
pub struct BusPaymentRecord {
    /// The payment ID, unique within the bus payment log
    pub id: PaymentId,

    /// Student the payment was applied to
    pub student: StudentId,

    /// Term the payment was recorded against
    pub term: TermId,

    /// Destination the student was assigned to at payment time
    pub destination: DestinationId,

    /// Amount paid (always positive)
    pub amount: Decimal,

    /// Day the payment was applied
    pub date: NaiveDate,

    /// Transport balance immediately after this payment settled
    pub balance_after: Decimal,
}

/// One event from a payments day-file
///
/// Day-files are bulk exports (M-Pesa statements, bank slips keyed in by
/// the bursar) applied in one run. A fee event carries the method and a
/// reference note; a bus event is just student and amount, since the
/// destination comes from the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// Tuition payment
    Fee {
        student: StudentId,
        amount: Decimal,
        method: PaymentMethod,
        /// Receipt or statement reference, stored as the description
        reference: String,
    },

    /// Transport payment
    Bus { student: StudentId, amount: Decimal },
}

impl PaymentEvent {
    /// The student this event applies to
    ///
    /// Bulk import partitions events by this key so one student's events
    /// are always applied in order.
    pub fn student(&self) -> StudentId {
        match self {
            PaymentEvent::Fee { student, .. } => *student,
            PaymentEvent::Bus { student, .. } => *student,
        }
    }

    /// The amount carried by this event
    pub fn amount(&self) -> Decimal {
        match self {
            PaymentEvent::Fee { amount, .. } => *amount,
            PaymentEvent::Bus { amount, .. } => *amount,
        }
    }
}

/// Outcome of applying one day-file event to an account
///
/// The concurrent import path settles events against a shared account
/// map and collects these, so audit records can be appended to the logs
/// in one pass once processing finishes. Per-student order is preserved;
/// order across students is not.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedPayment {
    /// A settled tuition payment awaiting its log record
    Fee {
        student: StudentId,
        amount: Decimal,
        method: PaymentMethod,
        reference: String,
        /// Tuition balance once the payment settled
        balance_after: Decimal,
    },

    /// A settled transport payment awaiting its log record
    Bus {
        student: StudentId,
        amount: Decimal,
        destination: DestinationId,
        /// Transport balance once the payment settled
        balance_after: Decimal,
    },
}
