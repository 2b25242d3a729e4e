//! Shule Ledger Library
//! # Overview
//!
//! This library keeps the fee and transport books for a school: per-term
//! tuition and bus-fare ledgers for every student, settled from single
//! payments or imported day-files with both sync and async strategies.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (StudentAccount, Ledger, Term, etc.)
//! - [`cli`] - CLI argument parsing and subcommands
//! - [`clock`] - Injectable calendar clock for term-close decisions
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Billing orchestration (settlement, rollover, promotion)
//!   - [`core::roster`] - Student account state
//!   - [`core::payment_log`] - Append-only payment audit records
//! - [`io`] - The CSV school directory and day-file readers
//! - [`strategy`] - Pluggable day-file import strategies
//!
//! # Ledger Model
//!
//! Each student carries a tuition ledger and a transport ledger, both a
//! triple of:
//!
//! - `balance`: What remains of the current term's charge
//! - `arrears`: Unpaid balances carried over from closed terms
//! - `prepayment`: Credit paid ahead of the current charge
//!
//! Payments settle arrears first, then the balance, and any excess
//! becomes prepayment. Prepayment is netted against the next term's
//! charge exactly once, and whatever is left when that term closes is
//! forfeited.

// Module declarations
pub mod cli;
pub mod clock;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use core::BillingEngine;
pub use io::{write_statement_csv, SchoolDir};
pub use types::{
    BillingError, BusDestination, BusPaymentRecord, DestinationId, Grade, Ledger, PaymentEvent,
    PaymentMethod, PaymentRecord, StudentAccount, StudentId, Term, TermId,
};
