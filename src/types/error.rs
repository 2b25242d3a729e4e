//! Error types for the school billing engine
//!
//! This module defines all error types that can occur while operating on
//! student ledgers. Errors are designed to be descriptive and user-friendly
//! for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Lookup Errors**: Unknown students, terms, destinations, payments
//! - **Billing Errors**: Missing fee schedules, no active term, invalid amounts
//! - **Arithmetic Errors**: Overflow, underflow in balance calculations

use super::grade::Grade;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the billing engine
///
/// This enum represents all possible errors that can occur while
/// mutating or querying student ledgers. Each variant includes relevant
/// context to help diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BillingError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Fatal when loading the school directory; recoverable (skip and
    /// continue) when reading a payments day-file.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// No student with the given id exists in the roster
    ///
    /// Recoverable during bulk import: the event is skipped and
    /// processing continues.
    #[error("Student {student} not found")]
    StudentNotFound {
        /// The unknown student id
        student: u32,
    },

    /// No term with the given id exists in the calendar
    #[error("Term {term} not found")]
    TermNotFound {
        /// The unknown term id
        term: u32,
    },

    /// No payment with the given id exists in the payment log
    #[error("Payment {payment} not found")]
    PaymentNotFound {
        /// The unknown payment id
        payment: u32,
    },

    /// No bus destination with the given id exists
    #[error("Destination {destination} not found")]
    DestinationNotFound {
        /// The unknown destination id
        destination: u32,
    },

    /// Bus payment attempted for a student without an assigned destination
    ///
    /// Recoverable: the payment is rejected and the account is unchanged.
    #[error("Student {student} has no bus destination assigned")]
    NoDestinationAssigned {
        /// Student the payment was for
        student: u32,
    },

    /// No term's date range covers the current date
    ///
    /// Payments and balance initialization are refused until a term
    /// is active.
    #[error("No active term covers {today}")]
    NoActiveTerm {
        /// The date that no term contains
        today: NaiveDate,
    },

    /// Rollover attempted but no term has ended yet
    ///
    /// Surfaced as an error rather than a crash; no student is modified.
    #[error("No term has ended as of {today}: nothing to roll over")]
    NoTermToRollover {
        /// The date the rollover was attempted on
        today: NaiveDate,
    },

    /// An ended term exists but no successor term is configured
    ///
    /// The rollover needs the next term's fee schedule; no student is
    /// modified.
    #[error("No term configured after term {term}")]
    NoFollowingTerm {
        /// The ended term with no successor
        term: u32,
    },

    /// No tuition fee configured for a grade in a term
    ///
    /// Fatal to the operation that needed it; batch operations abort
    /// without modifying any student.
    #[error("No fee configured for grade {grade} in term {term}")]
    ScheduleMissing {
        /// Term the lookup was against
        term: u32,
        /// Grade with no fee row
        grade: Grade,
    },

    /// No transport charge configured for a destination in a term
    ///
    /// Fatal to the operation that needed it; batch operations abort
    /// without modifying any student.
    #[error("No transport fee configured for destination {destination} in term {term}")]
    TransportScheduleMissing {
        /// Term the lookup was against
        term: u32,
        /// Destination with no charge row
        destination: u32,
    },

    /// Payment amount is zero or negative
    ///
    /// Recoverable: the payment is rejected before any mutation.
    #[error("Invalid payment amount {amount} for student {student}: amount must be positive")]
    InvalidAmount {
        /// Student the payment was for
        student: u32,
        /// The rejected amount
        amount: Decimal,
    },

    /// Fee schedule amount is negative
    ///
    /// Recoverable: the fee row is rejected and the schedule is unchanged.
    #[error("Invalid fee amount {amount}: fees cannot be negative")]
    InvalidFee {
        /// The rejected amount
        amount: Decimal,
    },

    /// Grade string outside the ladder encountered at an input boundary
    #[error("Unknown grade '{value}'")]
    UnknownGrade {
        /// The unrecognized grade string
        value: String,
    },

    /// Payment method string outside the accepted set
    #[error("Unknown payment method '{value}'")]
    UnknownMethod {
        /// The unrecognized method string
        value: String,
    },

    /// Admission numbers are unique across the roster
    #[error("Admission number '{admission}' is already registered")]
    DuplicateAdmission {
        /// The admission number that already exists
        admission: String,
    },

    /// A student with this id already exists in the roster
    #[error("Student {student} already exists")]
    DuplicateStudent {
        /// The colliding student id
        student: u32,
    },

    /// One tuition fee row per (term, grade)
    #[error("A fee for grade {grade} in term {term} already exists")]
    DuplicateFee {
        /// Term of the existing row
        term: u32,
        /// Grade of the existing row
        grade: Grade,
    },

    /// One transport charge row per (term, destination)
    #[error("A transport fee for destination {destination} in term {term} already exists")]
    DuplicateTransportFee {
        /// Term of the existing row
        term: u32,
        /// Destination of the existing row
        destination: u32,
    },

    /// A term with this id already exists in the calendar
    #[error("Term {term} already exists")]
    DuplicateTerm {
        /// The colliding term id
        term: u32,
    },

    /// Terms never overlap; the offending pair is reported
    #[error("Term {term} dates overlap term {other}")]
    TermOverlap {
        /// The term being added
        term: u32,
        /// The existing term it collides with
        other: u32,
    },

    /// A term whose start date is after its end date
    #[error("Term {term} starts after it ends")]
    InvalidTermRange {
        /// The malformed term
        term: u32,
    },

    /// Arithmetic overflow would occur
    ///
    /// Recoverable: the mutation is rejected to keep the ledger intact.
    #[error("Arithmetic overflow in {operation} for student {student}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Student whose ledger was being updated
        student: u32,
    },

    /// Arithmetic underflow would occur
    ///
    /// Recoverable: the mutation is rejected to keep the ledger intact.
    #[error("Arithmetic underflow in {operation} for student {student}")]
    ArithmeticUnderflow {
        /// Operation that would underflow
        operation: String,
        /// Student whose ledger was being updated
        student: u32,
    },
}

// Conversion from io::Error to BillingError
impl From<std::io::Error> for BillingError {
    fn from(error: std::io::Error) -> Self {
        BillingError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to BillingError
impl From<csv::Error> for BillingError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        BillingError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BillingError {
    /// Create a StudentNotFound error
    pub fn student_not_found(student: u32) -> Self {
        BillingError::StudentNotFound { student }
    }

    /// Create a TermNotFound error
    pub fn term_not_found(term: u32) -> Self {
        BillingError::TermNotFound { term }
    }

    /// Create a PaymentNotFound error
    pub fn payment_not_found(payment: u32) -> Self {
        BillingError::PaymentNotFound { payment }
    }

    /// Create a DestinationNotFound error
    pub fn destination_not_found(destination: u32) -> Self {
        BillingError::DestinationNotFound { destination }
    }

    /// Create a NoDestinationAssigned error
    pub fn no_destination_assigned(student: u32) -> Self {
        BillingError::NoDestinationAssigned { student }
    }

    /// Create a NoActiveTerm error
    pub fn no_active_term(today: NaiveDate) -> Self {
        BillingError::NoActiveTerm { today }
    }

    /// Create a NoTermToRollover error
    pub fn no_term_to_rollover(today: NaiveDate) -> Self {
        BillingError::NoTermToRollover { today }
    }

    /// Create a NoFollowingTerm error
    pub fn no_following_term(term: u32) -> Self {
        BillingError::NoFollowingTerm { term }
    }

    /// Create a ScheduleMissing error
    pub fn schedule_missing(term: u32, grade: Grade) -> Self {
        BillingError::ScheduleMissing { term, grade }
    }

    /// Create a TransportScheduleMissing error
    pub fn transport_schedule_missing(term: u32, destination: u32) -> Self {
        BillingError::TransportScheduleMissing { term, destination }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(student: u32, amount: Decimal) -> Self {
        BillingError::InvalidAmount { student, amount }
    }

    /// Create an InvalidFee error
    pub fn invalid_fee(amount: Decimal) -> Self {
        BillingError::InvalidFee { amount }
    }

    /// Create an UnknownGrade error
    pub fn unknown_grade(value: &str) -> Self {
        BillingError::UnknownGrade {
            value: value.to_string(),
        }
    }

    /// Create an UnknownMethod error
    pub fn unknown_method(value: &str) -> Self {
        BillingError::UnknownMethod {
            value: value.to_string(),
        }
    }

    /// Create a DuplicateAdmission error
    pub fn duplicate_admission(admission: &str) -> Self {
        BillingError::DuplicateAdmission {
            admission: admission.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, student: u32) -> Self {
        BillingError::ArithmeticOverflow {
            operation: operation.to_string(),
            student,
        }
    }

    /// Create an ArithmeticUnderflow error
    pub fn arithmetic_underflow(operation: &str, student: u32) -> Self {
        BillingError::ArithmeticUnderflow {
            operation: operation.to_string(),
            student,
        }
    }
}
