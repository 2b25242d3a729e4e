//! Concurrent implementations of the billing components
//!
//! This module provides thread-safe, concurrent implementations of the
//! day-file settlement path using DashMap for locking.
//!
//! # Architecture
//!
//! The concurrent import runs against the same account semantics as the
//! synchronous engine, but over concurrent data structures:
//!
//! - **AsyncRoster**: Thread-safe student account map using DashMap
//! - **AsyncBillingEngine**: Settles payment events against the shared map
//! - **BatchProcessor**: Partitions batches by student and settles them in
//!   parallel tasks
//!
//! Audit log records are not written here. Settlements come back as
//! `AppliedPayment` values and the synchronous engine appends the records
//! in one pass, so log ids stay sequential without a global lock.
//!
//! # Thread Safety
//!
//! All components are designed for safe concurrent access:
//! - Events for different students are settled in parallel
//! - Events for the same student are properly synchronized
//! - No global locks - fine-grained locking per student

pub mod batch_processor;
pub mod engine;
pub mod roster;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncBillingEngine;
pub use roster::AsyncRoster;
