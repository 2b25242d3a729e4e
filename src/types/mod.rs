//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Student accounts and the ledger triple
//! - `grade`: The ordered grade ladder
//! - `term`: School terms and their date ranges
//! - `payment`: Payment audit records and day-file events
//! - `error`: Error types for the billing engine

pub mod account;
pub mod error;
pub mod grade;
pub mod payment;
pub mod term;

pub use account::{BusDestination, DestinationId, Ledger, StudentAccount, StudentId};
pub use error::BillingError;
pub use grade::Grade;
pub use payment::{
    AppliedPayment, BusPaymentRecord, PaymentEvent, PaymentId, PaymentMethod, PaymentRecord,
};
pub use term::{Term, TermId};
